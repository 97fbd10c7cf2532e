pub mod flights;
pub mod hotel_rooms;
pub mod reservations;
pub mod shared;
pub mod tours;
pub mod vehicles;

use std::sync::Arc;

use anyhow::Context;
use voyage_crud::{Resource, ResourceService};
use voyage_db::Database;
use voyage_events::EventBus;
use voyage_kernel::{ModuleRegistry, Settings};

/// Open the collection of `R` and wrap it in a service.
pub async fn service<R: Resource>(
    db: &Database,
    events: &EventBus,
    settings: &Settings,
) -> anyhow::Result<Arc<ResourceService<R>>> {
    let collection = db
        .collection(R::COLLECTION)
        .await
        .with_context(|| format!("failed to open collection {}", R::COLLECTION))?;

    Ok(Arc::new(ResourceService::new(
        collection,
        events.clone(),
        settings.resources.id_retry_limit,
    )))
}

/// Register every resource module with the registry
pub async fn register_all(
    registry: &mut ModuleRegistry,
    db: &Database,
    events: &EventBus,
    settings: &Settings,
) -> anyhow::Result<()> {
    let vehicles = service::<vehicles::Vehicle>(db, events, settings).await?;
    let tours = service::<tours::Tour>(db, events, settings).await?;
    let hotel_rooms = service::<hotel_rooms::HotelRoom>(db, events, settings).await?;
    let flights = service::<flights::Flight>(db, events, settings).await?;
    let reservations = service::<reservations::Reservation>(db, events, settings).await?;

    registry.register(vehicles::create_module(vehicles))?;
    registry.register(tours::create_module(
        tours,
        hotel_rooms.clone(),
        flights.clone(),
    ))?;
    registry.register(hotel_rooms::create_module(hotel_rooms))?;
    registry.register(flights::create_module(flights))?;
    registry.register(reservations::create_module(reservations))?;
    Ok(())
}
