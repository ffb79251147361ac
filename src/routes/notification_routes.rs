use axum::{extract::State, routing::get, Json, Router};

use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::CallerIdentity;
use crate::models::notification::StoredNotification;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_notification_router() -> Router<AppState> {
    Router::new().route("/", get(my_notifications))
}

/// Bandeja del llamador, más recientes primero
async fn my_notifications(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
) -> Result<Json<ApiResponse<Vec<StoredNotification>>>, AppError> {
    let notifications = state.store.notifications_for(caller).await?;
    Ok(Json(ApiResponse::success(notifications)))
}
