use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::review::ReviewStatus;

// Request para dejar un avis sobre un trajet terminado
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    pub booking_id: Uuid,
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

// Decisión de moderación
#[derive(Debug, Deserialize, Validate)]
pub struct ModerateReviewRequest {
    pub decision: ReviewStatus,
}
