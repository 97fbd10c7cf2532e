//! Reservations: a tour plus complementary products, per user.

pub mod models;
pub mod routes;

use std::sync::Arc;

use voyage_crud::{ResourceModule, ResourceService};
use voyage_kernel::Module;

pub use models::Reservation;

pub fn create_module(service: Arc<ResourceService<Reservation>>) -> Arc<dyn Module> {
    let module = ResourceModule::new(service.clone())
        .with_routes(routes::router(service), routes::specs());
    Arc::new(module)
}
