use anyhow::Context;
use voyage_kernel::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load Voyage settings")?;
    voyage_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        "voyage-app bootstrap starting"
    );

    let app = voyage_app::bootstrap(settings).await?;
    app.serve(shutdown_signal()).await?;
    app.stop().await?;

    tracing::info!("voyage-app stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
    }
    tracing::info!("shutdown signal received");
}
