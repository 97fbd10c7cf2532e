//! Tours, plus the city and related-product queries built on top of them.

pub mod models;
pub mod routes;

use std::sync::Arc;

use voyage_crud::{ResourceModule, ResourceService};
use voyage_kernel::Module;

use crate::modules::flights::Flight;
use crate::modules::hotel_rooms::HotelRoom;
pub use models::{Tour, TourRelatedProducts};

pub fn create_module(
    tours: Arc<ResourceService<Tour>>,
    hotel_rooms: Arc<ResourceService<HotelRoom>>,
    flights: Arc<ResourceService<Flight>>,
) -> Arc<dyn Module> {
    let queries = routes::TourQueries {
        tours: tours.clone(),
        hotel_rooms,
        flights,
    };

    Arc::new(
        ResourceModule::new(tours)
            .with_routes(routes::router(queries), routes::specs())
            .with_schema(TourRelatedProducts::shape()),
    )
}
