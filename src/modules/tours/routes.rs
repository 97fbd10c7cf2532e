use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use voyage_crud::{FieldKind, Operation, Resource, ResourceService, ResponseDoc, RouteSpec};
use voyage_http::AppError;

use super::models::{Tour, TourRelatedProducts};
use crate::modules::flights::Flight;
use crate::modules::hotel_rooms::HotelRoom;

/// Services the tour queries read from.
#[derive(Clone)]
pub struct TourQueries {
    pub tours: Arc<ResourceService<Tour>>,
    pub hotel_rooms: Arc<ResourceService<HotelRoom>>,
    pub flights: Arc<ResourceService<Flight>>,
}

pub fn router(queries: TourQueries) -> Router {
    Router::new()
        .route(
            "/find-future-tours-in-city/{cityId}",
            get(find_future_tours_in_city),
        )
        .route(
            "/find-related-products-for-tour/{tourId}",
            get(find_related_products_for_tour),
        )
        .with_state(queries)
}

pub fn specs() -> Vec<RouteSpec> {
    vec![
        RouteSpec::new(
            Method::GET,
            "/find-future-tours-in-city/{cityId}",
            Operation::Query("findFutureToursInCity"),
            "Returns a list of future tours for a given city",
            Tour::TAG,
        )
        .param("cityId", FieldKind::String)
        .responds(StatusCode::OK, ResponseDoc::Records("Tour".into())),
        RouteSpec::new(
            Method::GET,
            "/find-related-products-for-tour/{tourId}",
            Operation::Query("findRelatedProductsForTour"),
            "Given a tour, offers the hotel rooms and flights that fit it",
            Tour::TAG,
        )
        .param("tourId", FieldKind::String)
        .responds(
            StatusCode::OK,
            ResponseDoc::Record("TourRelatedProducts".into()),
        )
        .errors(&[StatusCode::NOT_FOUND]),
    ]
}

async fn find_future_tours_in_city(
    State(queries): State<TourQueries>,
    Path(city_id): Path<String>,
) -> Result<Json<Vec<Tour>>, AppError> {
    let now = OffsetDateTime::now_utc();
    let tours = queries.tours.find_by("cityId", city_id).await?;
    Ok(Json(
        tours.into_iter().filter(|tour| tour.starts_after(now)).collect(),
    ))
}

async fn find_related_products_for_tour(
    State(queries): State<TourQueries>,
    Path(tour_id): Path<String>,
) -> Result<Json<TourRelatedProducts>, AppError> {
    let id = queries.tours.parse_id(&tour_id)?;
    let tour = queries.tours.get(&id).await?;

    let (hotel_rooms, flights) = tokio::try_join!(
        queries.hotel_rooms.find_by("cityId", tour.city_id.as_str()),
        queries
            .flights
            .find_by("destinationCityId", tour.city_id.as_str()),
    )?;

    tracing::debug!(
        tour_id = %tour.id,
        hotel_rooms = hotel_rooms.len(),
        flights = flights.len(),
        "related products found"
    );

    Ok(Json(TourRelatedProducts {
        tour,
        hotel_rooms,
        flights,
    }))
}
