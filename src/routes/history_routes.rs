//! Historiales de trajets por conductor y por pasajero

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::CallerIdentity;
use crate::models::booking::PassengerRide;
use crate::models::ride::Ride;
use crate::services::ride_lifecycle_service::HistoryScope;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/:driver_id/rides", get(driver_rides))
        .route("/:driver_id/rides/upcoming", get(driver_upcoming_rides))
        .route("/:driver_id/rides/past", get(driver_past_rides))
}

pub fn create_passenger_router() -> Router<AppState> {
    Router::new()
        .route("/:passenger_id/rides", get(passenger_rides))
        .route("/:passenger_id/rides/upcoming", get(passenger_upcoming_rides))
        .route("/:passenger_id/rides/past", get(passenger_past_rides))
}

type DriverRides = Result<Json<ApiResponse<Vec<Ride>>>, AppError>;
type PassengerRides = Result<Json<ApiResponse<Vec<PassengerRide>>>, AppError>;

async fn driver_history(state: AppState, driver_id: Uuid, caller: Uuid, scope: HistoryScope) -> DriverRides {
    let rides = state.rides.rides_by_driver(driver_id, caller, scope).await?;
    Ok(Json(ApiResponse::success(rides)))
}

async fn passenger_history(state: AppState, passenger_id: Uuid, caller: Uuid, scope: HistoryScope) -> PassengerRides {
    let rides = state
        .rides
        .rides_by_passenger(passenger_id, caller, scope)
        .await?;
    Ok(Json(ApiResponse::success(rides)))
}

async fn driver_rides(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Path(driver_id): Path<Uuid>,
) -> DriverRides {
    driver_history(state, driver_id, caller, HistoryScope::All).await
}

async fn driver_upcoming_rides(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Path(driver_id): Path<Uuid>,
) -> DriverRides {
    driver_history(state, driver_id, caller, HistoryScope::Upcoming).await
}

async fn driver_past_rides(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Path(driver_id): Path<Uuid>,
) -> DriverRides {
    driver_history(state, driver_id, caller, HistoryScope::Past).await
}

async fn passenger_rides(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Path(passenger_id): Path<Uuid>,
) -> PassengerRides {
    passenger_history(state, passenger_id, caller, HistoryScope::All).await
}

async fn passenger_upcoming_rides(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Path(passenger_id): Path<Uuid>,
) -> PassengerRides {
    passenger_history(state, passenger_id, caller, HistoryScope::Upcoming).await
}

async fn passenger_past_rides(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Path(passenger_id): Path<Uuid>,
) -> PassengerRides {
    passenger_history(state, passenger_id, caller, HistoryScope::Past).await
}
