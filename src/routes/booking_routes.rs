use axum::{extract::State, http::StatusCode, routing::{post, put}, Json, Router};

use crate::dto::api_response::ApiResponse;
use crate::dto::booking_dto::{BookRideRequest, CancelBookingRequest};
use crate::middleware::auth::CallerIdentity;
use crate::models::booking::Booking;
use crate::services::booking_ledger_service::CancellationOutcome;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::ValidatedJson;

pub fn create_booking_router() -> Router<AppState> {
    Router::new()
        .route("/", post(book_ride))
        .route("/cancel", put(cancel_booking))
}

async fn book_ride(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    ValidatedJson(request): ValidatedJson<BookRideRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Booking>>), AppError> {
    let booking = state
        .rides
        .book_ride(request.ride_id, request.passenger_id, caller)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            booking,
            "Booking confirmed".to_string(),
        )),
    ))
}

async fn cancel_booking(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    ValidatedJson(request): ValidatedJson<CancelBookingRequest>,
) -> Result<Json<ApiResponse<CancellationOutcome>>, AppError> {
    let outcome = state
        .bookings
        .cancel_booking(request.booking_id, request.passenger_id, caller)
        .await?;
    let message = outcome.message();

    Ok(Json(ApiResponse::success_with_message(outcome, message)))
}
