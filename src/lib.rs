//! Voyage application library
//!
//! Composes the resource modules (vehicles, tours, hotel rooms, flights and
//! reservations) on top of the Voyage kernel, storage and HTTP crates.

pub mod modules;

use std::future::Future;

use anyhow::Context;
use axum::Router;
use voyage_db::Database;
use voyage_events::EventBus;
use voyage_kernel::settings::DatabaseBackend;
use voyage_kernel::{InitCtx, ModuleRegistry, Settings};

/// Everything a running Voyage process owns.
pub struct App {
    pub settings: Settings,
    pub database: Database,
    pub events: EventBus,
    pub registry: ModuleRegistry,
}

/// Build storage, the event bus and every module from `settings`.
///
/// Nothing is initialized yet; call [`App::start`] before serving.
pub async fn compose(settings: Settings) -> anyhow::Result<App> {
    let database = match settings.database.backend {
        DatabaseBackend::Memory => Database::in_memory(),
        DatabaseBackend::File => Database::file_backed(&settings.database.data_dir)
            .await
            .with_context(|| {
                format!(
                    "failed to open file database in {}",
                    settings.database.data_dir
                )
            })?,
    };
    let events = EventBus::new();

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &database, &events, &settings).await?;

    tracing::info!(
        backend = ?settings.database.backend,
        modules = registry.modules().len(),
        "application composed"
    );

    Ok(App {
        settings,
        database,
        events,
        registry,
    })
}

impl App {
    fn ctx(&self) -> InitCtx<'_> {
        InitCtx {
            settings: &self.settings,
            db: &self.database,
            events: &self.events,
        }
    }

    /// Ensure indexes, then init and start every module.
    pub async fn start(&self) -> anyhow::Result<()> {
        self.registry
            .apply_indexes(&self.database)
            .await
            .context("failed to apply collection indexes")?;

        let ctx = self.ctx();
        self.registry.init_modules(&ctx).await?;
        self.registry.start_modules(&ctx).await?;
        Ok(())
    }

    pub fn router(&self) -> Router {
        voyage_http::build_router(&self.registry, &self.settings)
    }

    pub fn openapi(&self) -> serde_json::Value {
        voyage_http::router::openapi_document(&self.registry)
    }

    /// Serve HTTP until `shutdown` resolves.
    pub async fn serve<F>(&self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        voyage_http::start_server(&self.registry, &self.settings, shutdown).await
    }

    pub async fn stop(&self) -> anyhow::Result<()> {
        self.registry.stop_modules().await
    }
}

/// Compose and start an application in one step.
pub async fn bootstrap(settings: Settings) -> anyhow::Result<App> {
    let app = compose(settings).await?;
    app.start().await?;
    Ok(app)
}
