//! Modelo de Review (avis)
//!
//! Solo se implementa la transición básica de moderación:
//! `Pending -> Approved | Rejected`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::models::booking::{Booking, BookingStatus};
use crate::utils::errors::{illegal_transition, validation_error, AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "review_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "reviewId")]
    pub id: Uuid,
    pub booking_id: Uuid,
    pub ride_id: Uuid,
    pub author_id: Uuid,
    pub driver_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn from_new(id: Uuid, new_review: &NewReview) -> Self {
        Self {
            id,
            booking_id: new_review.booking_id,
            ride_id: new_review.ride_id,
            author_id: new_review.author_id,
            driver_id: new_review.driver_id,
            rating: new_review.rating,
            comment: new_review.comment.clone(),
            status: ReviewStatus::Pending,
            created_at: new_review.created_at,
            updated_at: new_review.created_at,
        }
    }

    pub fn status(&self) -> ReviewStatus {
        self.status
    }

    /// Decisión de un empleado sobre un avis pendiente
    pub fn moderate(&mut self, decision: ReviewStatus, now: DateTime<Utc>) -> AppResult<()> {
        match (self.status, decision) {
            (ReviewStatus::Pending, ReviewStatus::Approved | ReviewStatus::Rejected) => {
                self.status = decision;
                self.updated_at = now;
                Ok(())
            }
            (from, to) => Err(illegal_transition(from, to)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub booking_id: Uuid,
    pub ride_id: Uuid,
    pub author_id: Uuid,
    pub driver_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewReview {
    /// Solo el pasajero de un trajet terminado puede dejar un avis
    pub fn new(
        booking: &Booking,
        author_id: Uuid,
        rating: i16,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        if booking.passenger_id() != author_id {
            return Err(AppError::Forbidden(
                "only the passenger of a booking can review it".to_string(),
            ));
        }
        if booking.status() != BookingStatus::Past {
            return Err(illegal_transition(booking.status(), "reviewed"));
        }
        if !(1..=5).contains(&rating) {
            return Err(validation_error("rating", "rating must be between 1 and 5"));
        }

        Ok(Self {
            booking_id: booking.id,
            ride_id: booking.ride_id(),
            author_id,
            driver_id: booking.driver_id(),
            rating,
            comment: comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            created_at: now,
        })
    }
}
