use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use serde_json::Value;
use voyage_db::IndexSpec;
use voyage_events::EventHandler;
use voyage_kernel::{CollectionIndex, InitCtx, Module};

use crate::resource::Resource;
use crate::routes::{crud_router, crud_table, openapi_fragment, RouteSpec};
use crate::service::ResourceService;
use crate::shape::Shape;

/// Kernel module serving one resource under `/api/{collection}`.
///
/// Carries the CRUD routes of `R` plus any resource-specific routes, and the
/// listeners to subscribe to `R`'s created event.
pub struct ResourceModule<R: Resource> {
    service: Arc<ResourceService<R>>,
    listeners: Vec<Arc<dyn EventHandler>>,
    extra_routes: Router,
    extra_specs: Vec<RouteSpec>,
    extra_schemas: Vec<Shape>,
}

impl<R: Resource> ResourceModule<R> {
    pub fn new(service: Arc<ResourceService<R>>) -> Self {
        Self {
            service,
            listeners: Vec::new(),
            extra_routes: Router::new(),
            extra_specs: Vec::new(),
            extra_schemas: Vec::new(),
        }
    }

    pub fn service(&self) -> &Arc<ResourceService<R>> {
        &self.service
    }

    /// Subscribe `listener` to `R::created_event()` during init.
    pub fn with_listener(mut self, listener: Arc<dyn EventHandler>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Add resource-specific routes. `specs` documents them.
    pub fn with_routes(mut self, router: Router, specs: Vec<RouteSpec>) -> Self {
        self.extra_routes = self.extra_routes.merge(router);
        self.extra_specs.extend(specs);
        self
    }

    /// Publish an additional component schema.
    pub fn with_schema(mut self, shape: Shape) -> Self {
        self.extra_schemas.push(shape);
        self
    }

    /// CRUD routes followed by the resource-specific ones.
    pub fn route_table(&self) -> Vec<RouteSpec> {
        let mut table = crud_table::<R>();
        table.extend(self.extra_specs.iter().cloned());
        table
    }
}

#[async_trait]
impl<R: Resource> Module for ResourceModule<R> {
    fn name(&self) -> &'static str {
        R::COLLECTION
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let event = R::created_event();
        for listener in &self.listeners {
            tracing::info!(
                module = R::COLLECTION,
                event = %event,
                listener = listener.name(),
                "subscribing listener"
            );
            ctx.events.subscribe(event.clone(), listener.clone()).await;
        }
        Ok(())
    }

    fn routes(&self) -> Router {
        crud_router(self.service.clone()).merge(self.extra_routes.clone())
    }

    fn openapi(&self) -> Option<Value> {
        let shapes = self.service.shapes();
        let schemas = [&shapes.record, &shapes.create, &shapes.update]
            .into_iter()
            .chain(self.extra_schemas.iter());
        Some(openapi_fragment(R::COLLECTION, &self.route_table(), schemas))
    }

    fn indexes(&self) -> Vec<CollectionIndex> {
        vec![CollectionIndex {
            collection: R::COLLECTION,
            index: IndexSpec::descending("id").unique(),
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::debug!(
            module = R::COLLECTION,
            routes = self.route_table().len(),
            "module started"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{Operation, ResponseDoc};
    use crate::testing::{car_payload, cars, Car, Recorder};
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::routing::get;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tower::ServiceExt;
    use voyage_db::Database;
    use voyage_events::EventBus;
    use voyage_kernel::Settings;

    #[tokio::test]
    async fn declares_a_unique_descending_id_index() {
        let (service, _events) = cars().await;
        let module = ResourceModule::new(Arc::new(service));

        assert_eq!(module.name(), "cars");
        assert_eq!(
            module.indexes(),
            vec![CollectionIndex {
                collection: "cars",
                index: IndexSpec::descending("id").unique(),
            }]
        );
    }

    #[tokio::test]
    async fn init_subscribes_listeners_to_the_created_event() {
        let (service, events) = cars().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let module = ResourceModule::new(Arc::new(service)).with_listener(Arc::new(Recorder(tx)));

        let (settings, db) = (Settings::default(), Database::in_memory());
        let ctx = InitCtx {
            settings: &settings,
            db: &db,
            events: &events,
        };
        module.init(&ctx).await.unwrap();
        assert_eq!(events.subscriber_count("carCreated").await, 1);

        module.service().create(car_payload("Civic", 2020)).await.unwrap();
        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.payload["model"], "Civic");
    }

    #[tokio::test]
    async fn extra_routes_sit_next_to_the_crud_routes() {
        let (service, _events) = cars().await;
        let extra = Router::new().route("/oldest", get(|| async { "none yet" }));
        let module = ResourceModule::new(Arc::new(service)).with_routes(
            extra,
            vec![RouteSpec::new(
                Method::GET,
                "/oldest",
                Operation::Query("findOldestCar"),
                "Oldest car",
                Car::TAG,
            )
            .responds(StatusCode::OK, ResponseDoc::Schema(serde_json::json!({"type": "string"})))],
        );

        let router = module.routes();
        let response = router
            .clone()
            .oneshot(Request::builder().uri("/oldest").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let doc = module.openapi().unwrap();
        assert_eq!(doc["paths"]["/oldest"]["get"]["operationId"], "findOldestCar");
        assert!(doc["paths"]["/"]["post"].is_object());
        assert!(doc["components"]["schemas"]["NewCar"].is_object());
        assert_eq!(module.route_table().len(), 6);
    }

    #[tokio::test]
    async fn lifecycle_through_the_registry() {
        let events = EventBus::new();
        let db = Database::in_memory();
        let collection = db.collection("cars").await.unwrap();
        let service: ResourceService<Car> = ResourceService::new(collection, events.clone(), 8);

        let mut registry = voyage_kernel::ModuleRegistry::new();
        registry
            .register(Arc::new(ResourceModule::new(Arc::new(service))))
            .unwrap();
        registry.apply_indexes(&db).await.unwrap();

        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
            db: &db,
            events: &events,
        };
        registry.init_modules(&ctx).await.unwrap();
        registry.start_modules(&ctx).await.unwrap();
        registry.stop_modules().await.unwrap();
    }
}
