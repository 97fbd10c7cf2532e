pub mod models;

use std::sync::Arc;

use voyage_crud::{ResourceModule, ResourceService};
use voyage_kernel::Module;

pub use models::Flight;

pub fn create_module(service: Arc<ResourceService<Flight>>) -> Arc<dyn Module> {
    Arc::new(ResourceModule::new(service))
}
