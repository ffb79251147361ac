//! Avis de pasajeros y su moderación

use std::sync::Arc;

use uuid::Uuid;

use crate::models::review::{NewReview, Review, ReviewStatus};
use crate::models::user::Role;
use crate::repositories::store::CarpoolStore;
use crate::services::authorization_service::AuthorizationService;
use crate::services::clock::Clock;
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct ReviewService {
    store: Arc<dyn CarpoolStore>,
    authz: Arc<AuthorizationService>,
    clock: Arc<dyn Clock>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn CarpoolStore>, authz: Arc<AuthorizationService>, clock: Arc<dyn Clock>) -> Self {
        Self { store, authz, clock }
    }

    /// Un pasajero deja un avis sobre un trajet terminado; queda pendiente
    #[tracing::instrument(skip(self, comment))]
    pub async fn submit_review(
        &self,
        booking_id: Uuid,
        rating: i16,
        comment: Option<String>,
        caller: Uuid,
    ) -> AppResult<Review> {
        self.authz.resolve(caller).await?;

        let mut tx = self.store.begin().await?;
        let booking = tx
            .lock_booking(booking_id)
            .await?
            .ok_or_else(|| not_found_error("Booking", &booking_id.to_string()))?;

        let new_review = NewReview::new(&booking, caller, rating, comment, self.clock.now())?;
        if tx.review_exists_for_booking(booking_id).await? {
            return Err(AppError::BadRequest(
                "this booking has already been reviewed".to_string(),
            ));
        }

        let review = tx.insert_review(&new_review).await?;
        tx.commit().await?;

        tracing::info!(review_id = %review.id, rating, "📝 Avis enviado a moderación");
        Ok(review)
    }

    pub async fn pending_reviews(&self, caller: Uuid) -> AppResult<Vec<Review>> {
        let actor = self.authz.resolve(caller).await?;
        self.authz
            .require_any_role(&actor, &[Role::Employee, Role::Admin], "list pending reviews")?;

        self.store.pending_reviews().await
    }

    /// Pending -> Approved | Rejected
    #[tracing::instrument(skip(self))]
    pub async fn moderate_review(&self, review_id: Uuid, decision: ReviewStatus, caller: Uuid) -> AppResult<Review> {
        let actor = self.authz.resolve(caller).await?;
        self.authz
            .require_any_role(&actor, &[Role::Employee, Role::Admin], "moderate review")?;

        let mut tx = self.store.begin().await?;
        let mut review = tx
            .lock_review(review_id)
            .await?
            .ok_or_else(|| not_found_error("Review", &review_id.to_string()))?;

        review.moderate(decision, self.clock.now())?;
        tx.update_review(&review).await?;
        tx.commit().await?;

        tracing::info!(status = ?review.status(), "✅ Avis moderado");
        Ok(review)
    }
}
