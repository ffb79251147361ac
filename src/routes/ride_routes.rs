use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::ride_dto::{AddRideRequest, RideActionRequest, RideSearchQuery};
use crate::middleware::auth::CallerIdentity;
use crate::models::ride::Ride;
use crate::services::ride_lifecycle_service::FinalizeOutcome;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::{ValidatedJson, ValidatedQuery};

pub fn create_ride_router() -> Router<AppState> {
    Router::new()
        .route("/", post(add_ride))
        .route("/search", get(search_rides))
        .route("/cancel", put(cancel_ride))
        .route("/start", put(start_ride))
        .route("/finalize", put(finalize_ride))
        .route("/:id", get(get_ride))
}

async fn add_ride(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    ValidatedJson(request): ValidatedJson<AddRideRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Ride>>), AppError> {
    let (driver_id, draft) = request.into_parts();
    let ride = state.rides.add_ride(draft, driver_id, caller).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            ride,
            "Ride published".to_string(),
        )),
    ))
}

async fn search_rides(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<RideSearchQuery>,
) -> Result<Json<ApiResponse<Vec<Ride>>>, AppError> {
    let rides = state.rides.search_rides(query.into()).await?;
    Ok(Json(ApiResponse::success(rides)))
}

async fn get_ride(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Ride>>, AppError> {
    let ride = state.rides.get_ride(id).await?;
    Ok(Json(ApiResponse::success(ride)))
}

async fn cancel_ride(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    ValidatedJson(request): ValidatedJson<RideActionRequest>,
) -> Result<Json<ApiResponse<Ride>>, AppError> {
    let ride = state
        .rides
        .cancel_ride(request.ride_id, request.driver_id, caller)
        .await?;

    Ok(Json(ApiResponse::success_with_message(
        ride,
        "Ride cancelled, passengers refunded".to_string(),
    )))
}

async fn start_ride(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    ValidatedJson(request): ValidatedJson<RideActionRequest>,
) -> Result<Json<ApiResponse<Ride>>, AppError> {
    let ride = state
        .rides
        .start_ride(request.ride_id, request.driver_id, caller)
        .await?;

    Ok(Json(ApiResponse::success_with_message(
        ride,
        "Ride started".to_string(),
    )))
}

async fn finalize_ride(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    ValidatedJson(request): ValidatedJson<RideActionRequest>,
) -> Result<Json<ApiResponse<FinalizeOutcome>>, AppError> {
    let outcome = state
        .rides
        .finalize_ride(request.ride_id, request.driver_id, caller)
        .await?;
    let message = format!(
        "Ride finalized, {} credits paid to the driver",
        outcome.driver_earnings
    );

    Ok(Json(ApiResponse::success_with_message(outcome, message)))
}
