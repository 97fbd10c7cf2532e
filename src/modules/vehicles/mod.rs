//! Vehicles: sequential integer ids and a creation log.

pub mod events;
pub mod models;

use std::sync::Arc;

use voyage_crud::{ResourceModule, ResourceService};
use voyage_kernel::Module;

pub use models::Vehicle;

pub fn create_module(service: Arc<ResourceService<Vehicle>>) -> Arc<dyn Module> {
    Arc::new(ResourceModule::new(service).with_listener(Arc::new(events::VehicleCreatedListener)))
}
