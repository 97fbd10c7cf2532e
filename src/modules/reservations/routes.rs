use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    routing::{delete, get},
    Json, Router,
};
use voyage_crud::{FieldKind, Operation, Resource, ResourceService, ResponseDoc, RouteSpec, Success};
use voyage_http::AppError;

use super::models::Reservation;

type Reservations = Arc<ResourceService<Reservation>>;

pub fn router(reservations: Reservations) -> Router {
    Router::new()
        .route("/find-user-reservations/{userId}", get(find_user_reservations))
        .route("/cancel-reservation/{reservationId}", delete(cancel_reservation))
        .with_state(reservations)
}

pub fn specs() -> Vec<RouteSpec> {
    vec![
        RouteSpec::new(
            Method::GET,
            "/find-user-reservations/{userId}",
            Operation::Query("findUserReservations"),
            "Returns all the reservations a user has made",
            Reservation::TAG,
        )
        .param("userId", FieldKind::String)
        .responds(StatusCode::OK, ResponseDoc::Records("Reservation".into())),
        RouteSpec::new(
            Method::DELETE,
            "/cancel-reservation/{reservationId}",
            Operation::Query("cancelReservation"),
            "Cancels a reservation and its related products",
            Reservation::TAG,
        )
        .param("reservationId", FieldKind::String)
        .responds(StatusCode::OK, ResponseDoc::Success)
        .errors(&[StatusCode::BAD_REQUEST]),
    ]
}

async fn find_user_reservations(
    State(reservations): State<Reservations>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    Ok(Json(reservations.find_by("userId", user_id).await?))
}

async fn cancel_reservation(
    State(reservations): State<Reservations>,
    Path(reservation_id): Path<String>,
) -> Result<Json<Success>, AppError> {
    let id = reservations.parse_id(&reservation_id)?;
    tracing::info!(reservation_id = %id, "cancelling reservation");
    reservations.remove(id).await?;
    Ok(Success::ok())
}
