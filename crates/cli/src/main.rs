use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use voyage_kernel::Settings;

#[derive(Debug, Parser)]
#[command(name = "voyage", version, about = "Voyage travel resource services")]
struct Cli {
    /// Directory holding base.toml and the environment overlays
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// local, staging or production
    #[arg(long, global = true)]
    environment: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Override server.port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print every HTTP route with its summary
    Routes,
    /// Print the merged OpenAPI document
    Openapi {
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(settings, port).await,
        Command::Routes => {
            let app = voyage_app::compose(settings).await?;
            for line in route_lines(&app.openapi()) {
                println!("{line}");
            }
            Ok(())
        }
        Command::Openapi { compact } => {
            let app = voyage_app::compose(settings).await?;
            let document = app.openapi();
            let rendered = if compact {
                serde_json::to_string(&document)?
            } else {
                serde_json::to_string_pretty(&document)?
            };
            println!("{rendered}");
            Ok(())
        }
    }
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let loaded = match (&cli.config_dir, &cli.environment) {
        (None, None) => Settings::load(),
        (config_dir, environment) => {
            let config_dir = match config_dir {
                Some(dir) => dir.clone(),
                None => std::env::current_dir()
                    .context("unable to resolve current directory")?
                    .join("config"),
            };
            let environment = environment
                .clone()
                .or_else(|| std::env::var("VOYAGE_ENV").ok())
                .unwrap_or_else(|| "local".to_string());
            Settings::load_from(&config_dir, &environment)
        }
    };
    loaded.context("failed to load Voyage settings")
}

async fn serve(mut settings: Settings, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port {
        settings.server.port = port;
    }
    voyage_telemetry::init(&settings.telemetry)?;

    let app = voyage_app::bootstrap(settings).await?;
    app.serve(async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    })
    .await?;
    app.stop().await
}

/// `METHOD  /path  summary` for every operation in an OpenAPI document.
fn route_lines(document: &Value) -> Vec<String> {
    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    for (path, item) in paths {
        let Some(operations) = item.as_object() else {
            continue;
        };
        for (method, operation) in operations {
            let summary = operation
                .get("summary")
                .and_then(Value::as_str)
                .unwrap_or_default();
            lines.push(format!(
                "{:<7} {:<56} {}",
                method.to_uppercase(),
                path,
                summary
            ));
        }
    }
    lines
}
