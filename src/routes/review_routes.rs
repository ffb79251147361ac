use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::review_dto::{ModerateReviewRequest, SubmitReviewRequest};
use crate::middleware::auth::CallerIdentity;
use crate::models::review::Review;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::ValidatedJson;

pub fn create_review_router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_review))
        .route("/pending", get(pending_reviews))
        .route("/:id/moderate", put(moderate_review))
}

async fn submit_review(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    ValidatedJson(request): ValidatedJson<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Review>>), AppError> {
    let review = state
        .reviews
        .submit_review(request.booking_id, request.rating, request.comment, caller)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            review,
            "Review submitted for moderation".to_string(),
        )),
    ))
}

async fn pending_reviews(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
) -> Result<Json<ApiResponse<Vec<Review>>>, AppError> {
    let reviews = state.reviews.pending_reviews(caller).await?;
    Ok(Json(ApiResponse::success(reviews)))
}

async fn moderate_review(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<ModerateReviewRequest>,
) -> Result<Json<ApiResponse<Review>>, AppError> {
    let review = state
        .reviews
        .moderate_review(id, request.decision, caller)
        .await?;
    Ok(Json(ApiResponse::success(review)))
}
