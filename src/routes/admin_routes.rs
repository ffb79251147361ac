//! Estadísticas para administradores

use axum::{extract::State, routing::get, Json, Router};

use crate::dto::api_response::ApiResponse;
use crate::dto::ride_dto::PeriodQuery;
use crate::middleware::auth::CallerIdentity;
use crate::models::stats::PeriodStats;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::ValidatedQuery;

pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/stats/rides-today", get(rides_today))
        .route("/stats/rides", get(rides_over_period))
        .route("/stats/commission-today", get(commission_today))
        .route("/stats/commission", get(commission_over_period))
}

type StatsResponse = Result<Json<ApiResponse<PeriodStats>>, AppError>;

async fn rides_today(State(state): State<AppState>, CallerIdentity(caller): CallerIdentity) -> StatsResponse {
    let stats = state.rides.rides_today(caller).await?;
    Ok(Json(ApiResponse::success(stats)))
}

async fn rides_over_period(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    ValidatedQuery(period): ValidatedQuery<PeriodQuery>,
) -> StatsResponse {
    let stats = state
        .rides
        .rides_over_period(period.start, period.end, caller)
        .await?;
    Ok(Json(ApiResponse::success(stats)))
}

async fn commission_today(State(state): State<AppState>, CallerIdentity(caller): CallerIdentity) -> StatsResponse {
    let stats = state.rides.commission_today(caller).await?;
    Ok(Json(ApiResponse::success(stats)))
}

async fn commission_over_period(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    ValidatedQuery(period): ValidatedQuery<PeriodQuery>,
) -> StatsResponse {
    let stats = state
        .rides
        .commission_over_period(period.start, period.end, caller)
        .await?;
    Ok(Json(ApiResponse::success(stats)))
}
