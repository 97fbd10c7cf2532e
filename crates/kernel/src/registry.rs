use anyhow::Context;
use std::sync::Arc;

use voyage_db::Database;

use crate::module::{CollectionIndex, InitCtx, Module};

/// Module registry for managing module lifecycle in registration order
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Create a new module registry
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Register a module. Names must be unique.
    pub fn register(&mut self, module: Arc<dyn Module>) -> anyhow::Result<()> {
        if self.get_module(module.name()).is_some() {
            anyhow::bail!("module '{}' is already registered", module.name());
        }
        self.modules.push(module);
        Ok(())
    }

    /// Get all registered modules in registration order
    pub fn modules(&self) -> &[Arc<dyn Module>] {
        &self.modules
    }

    /// Get a module by name
    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules.iter().find(|module| module.name() == name)
    }

    /// Collect all indexes declared by modules, ordered by collection then field
    pub fn collect_indexes(&self) -> Vec<(String, CollectionIndex)> {
        let mut indexes: Vec<(String, CollectionIndex)> = self
            .modules
            .iter()
            .flat_map(|module| {
                module
                    .indexes()
                    .into_iter()
                    .map(|index| (module.name().to_string(), index))
            })
            .collect();

        indexes.sort_by(|a, b| {
            a.1.collection
                .cmp(b.1.collection)
                .then_with(|| a.1.index.field.cmp(&b.1.index.field))
        });
        indexes
    }

    /// Make sure every declared index exists
    pub async fn apply_indexes(&self, db: &Database) -> anyhow::Result<()> {
        for (module, declared) in self.collect_indexes() {
            tracing::info!(
                module = %module,
                collection = declared.collection,
                field = %declared.index.field,
                unique = declared.index.unique,
                "ensuring index"
            );

            db.collection(declared.collection)
                .await?
                .ensure_index(declared.index.clone())
                .await
                .with_context(|| {
                    format!(
                        "failed to ensure index on {}.{}",
                        declared.collection, declared.index.field
                    )
                })?;
        }
        Ok(())
    }

    /// Initialize modules in registration order
    pub async fn init_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("initializing {} modules", self.modules.len());

        for module in &self.modules {
            tracing::info!(module = module.name(), "initializing module");

            module
                .init(ctx)
                .await
                .with_context(|| format!("failed to initialize module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Start modules in registration order
    pub async fn start_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in &self.modules {
            tracing::info!(module = module.name(), "starting module");

            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Stop modules in reverse registration order
    pub async fn stop_modules(&self) -> anyhow::Result<()> {
        for module in self.modules.iter().rev() {
            tracing::info!(module = module.name(), "stopping module");

            module
                .stop()
                .await
                .with_context(|| format!("failed to stop module '{}'", module.name()))?;
        }

        Ok(())
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use std::sync::Mutex;
    use voyage_db::{Document, FindOptions, IndexSpec};
    use voyage_events::EventBus;

    struct TestModule {
        name: &'static str,
        collection: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl TestModule {
        fn record(&self, step: &str) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{}", step, self.name));
        }
    }

    #[async_trait::async_trait]
    impl Module for TestModule {
        fn name(&self) -> &'static str {
            self.name
        }

        fn indexes(&self) -> Vec<CollectionIndex> {
            vec![CollectionIndex {
                collection: self.collection,
                index: IndexSpec::descending("id").unique(),
            }]
        }

        async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
            self.record("init");
            Ok(())
        }

        async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
            self.record("start");
            Ok(())
        }

        async fn stop(&self) -> anyhow::Result<()> {
            self.record("stop");
            Ok(())
        }
    }

    fn module(
        name: &'static str,
        collection: &'static str,
        log: &Arc<Mutex<Vec<String>>>,
    ) -> Arc<dyn Module> {
        Arc::new(TestModule {
            name,
            collection,
            log: log.clone(),
        })
    }

    #[test]
    fn test_module_registry_creation() {
        let registry = ModuleRegistry::new();
        assert!(registry.modules().is_empty());
        assert!(registry.collect_indexes().is_empty());
    }

    #[test]
    fn test_duplicate_module_rejected() {
        let log = Arc::default();
        let mut registry = ModuleRegistry::new();
        registry.register(module("tours", "tours", &log)).unwrap();
        assert!(registry.register(module("tours", "tours", &log)).is_err());
    }

    #[test]
    fn test_index_collection_is_sorted() {
        let log = Arc::default();
        let mut registry = ModuleRegistry::new();
        registry.register(module("vehicles", "vehicles", &log)).unwrap();
        registry.register(module("flights", "flights", &log)).unwrap();

        let collections: Vec<_> = registry
            .collect_indexes()
            .into_iter()
            .map(|(_, index)| index.collection)
            .collect();
        assert_eq!(collections, vec!["flights", "vehicles"]);
    }

    #[tokio::test]
    async fn test_indexes_are_applied() {
        let log = Arc::default();
        let mut registry = ModuleRegistry::new();
        registry.register(module("vehicles", "vehicles", &log)).unwrap();

        let db = Database::in_memory();
        registry.apply_indexes(&db).await.unwrap();

        let vehicles = db.collection("vehicles").await.unwrap();
        let mut record = Document::new();
        record.insert("id".into(), serde_json::json!(1));
        vehicles.insert_one(record.clone()).await.unwrap();
        assert!(vehicles.insert_one(record).await.is_err());
        assert_eq!(
            vehicles
                .find(&Document::new(), FindOptions::default())
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_module_lifecycle() {
        let log: Arc<Mutex<Vec<String>>> = Arc::default();
        let mut registry = ModuleRegistry::new();
        registry.register(module("vehicles", "vehicles", &log)).unwrap();
        registry.register(module("tours", "tours", &log)).unwrap();

        let settings = Settings::default();
        let db = Database::in_memory();
        let events = EventBus::new();
        let ctx = InitCtx {
            settings: &settings,
            db: &db,
            events: &events,
        };

        registry.init_modules(&ctx).await.unwrap();
        registry.start_modules(&ctx).await.unwrap();
        registry.stop_modules().await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "init:vehicles",
                "init:tours",
                "start:vehicles",
                "start:tours",
                "stop:tours",
                "stop:vehicles",
            ]
        );
    }
}
