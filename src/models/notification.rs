//! Notificaciones del ciclo de vida de trajets y reservas

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    RidePublished,
    BookingConfirmed,
    NewPassenger,
    BookingCancelled,
    LateCancellation,
    RideCancelled,
    RideStarted,
    RideFinalized,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::RidePublished => "ride_published",
            NotificationKind::BookingConfirmed => "booking_confirmed",
            NotificationKind::NewPassenger => "new_passenger",
            NotificationKind::BookingCancelled => "booking_cancelled",
            NotificationKind::LateCancellation => "late_cancellation",
            NotificationKind::RideCancelled => "ride_cancelled",
            NotificationKind::RideStarted => "ride_started",
            NotificationKind::RideFinalized => "ride_finalized",
        }
    }
}

/// Mensaje destinado a un usuario
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub ride_id: Option<Uuid>,
    pub message: String,
}

impl Notification {
    pub fn new(user_id: Uuid, kind: NotificationKind, ride_id: Option<Uuid>, message: String) -> Self {
        Self {
            user_id,
            kind,
            ride_id,
            message,
        }
    }
}

/// Notificación guardada en la bandeja del usuario
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StoredNotification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub ride_id: Option<Uuid>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
