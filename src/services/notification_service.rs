//! Servicio de notificaciones
//!
//! Las notificaciones se envían después del commit. Un fallo de entrega se
//! registra y nunca deshace la operación ya confirmada.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::future::join_all;
use uuid::Uuid;

use crate::models::booking::Booking;
use crate::models::notification::{Notification, NotificationKind};
use crate::models::ride::Ride;
use crate::repositories::store::CarpoolStore;
use crate::utils::errors::AppResult;

/// Destino de las notificaciones
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> AppResult<()>;
}

/// Guarda cada notificación en la bandeja del usuario
pub struct StoreNotificationSink {
    store: Arc<dyn CarpoolStore>,
}

impl StoreNotificationSink {
    pub fn new(store: Arc<dyn CarpoolStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl NotificationSink for StoreNotificationSink {
    async fn deliver(&self, notification: &Notification) -> AppResult<()> {
        self.store.push_notification(notification).await
    }
}

/// Solo escribe en el log
#[derive(Debug, Default)]
pub struct TracingNotificationSink;

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn deliver(&self, notification: &Notification) -> AppResult<()> {
        tracing::info!(
            user_id = %notification.user_id,
            kind = notification.kind.as_str(),
            "📨 {}",
            notification.message
        );
        Ok(())
    }
}

/// Guarda en memoria todo lo enviado, para inspeccionarlo después
#[derive(Debug, Default)]
pub struct RecordingNotificationSink {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn sent_to(&self, user_id: Uuid) -> Vec<Notification> {
        self.sent()
            .into_iter()
            .filter(|n| n.user_id == user_id)
            .collect()
    }

    pub fn kinds_for(&self, user_id: Uuid) -> Vec<NotificationKind> {
        self.sent_to(user_id).into_iter().map(|n| n.kind).collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn deliver(&self, notification: &Notification) -> AppResult<()> {
        match self.sent.lock() {
            Ok(mut sent) => sent.push(notification.clone()),
            Err(poisoned) => poisoned.into_inner().push(notification.clone()),
        }
        Ok(())
    }
}

pub struct NotificationService {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationService {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Envía todas las notificaciones en paralelo; los fallos solo se registran
    pub async fn dispatch(&self, notifications: Vec<Notification>) {
        let deliveries = notifications.iter().map(|n| self.sink.deliver(n));
        let results = join_all(deliveries).await;

        for (notification, result) in notifications.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!(
                    user_id = %notification.user_id,
                    kind = notification.kind.as_str(),
                    "⚠️ No se pudo entregar la notificación: {}",
                    e
                );
            }
        }
    }
}

fn route(ride: &Ride) -> String {
    format!(
        "{} → {} ({})",
        ride.departure_place,
        ride.arrival_place,
        ride.departure_date_time.format("%Y-%m-%d %H:%M")
    )
}

pub fn ride_published(ride: &Ride) -> Notification {
    Notification::new(
        ride.driver_id,
        NotificationKind::RidePublished,
        Some(ride.id),
        format!(
            "Your ride {} is published; {} credits of commission were charged",
            route(ride),
            ride.commission
        ),
    )
}

pub fn booking_confirmed(ride: &Ride, booking: &Booking) -> Vec<Notification> {
    vec![
        Notification::new(
            booking.passenger_id(),
            NotificationKind::BookingConfirmed,
            Some(ride.id),
            format!("Your seat on {} is confirmed for {} credits", route(ride), ride.price),
        ),
        Notification::new(
            booking.driver_id(),
            NotificationKind::NewPassenger,
            Some(ride.id),
            format!(
                "A passenger booked your ride {}; {} seat(s) left",
                route(ride),
                ride.available_seats()
            ),
        ),
    ]
}

/// Cancelación por parte del pasajero, con o sin reembolso
pub fn booking_cancelled(ride: &Ride, booking: &Booking, refunded: bool) -> Vec<Notification> {
    let (kind, passenger_msg, driver_msg) = if refunded {
        (
            NotificationKind::BookingCancelled,
            format!(
                "Your booking on {} is cancelled and {} credits were refunded",
                route(ride),
                ride.price
            ),
            format!("A passenger cancelled their booking on {}", route(ride)),
        )
    } else {
        (
            NotificationKind::LateCancellation,
            format!(
                "Your booking on {} is cancelled; it was too late for a refund",
                route(ride)
            ),
            format!("A passenger cancelled late on {}", route(ride)),
        )
    };

    vec![
        Notification::new(booking.passenger_id(), kind, Some(ride.id), passenger_msg),
        Notification::new(booking.driver_id(), kind, Some(ride.id), driver_msg),
    ]
}

pub fn ride_cancelled(ride: &Ride, bookings: &[Booking]) -> Vec<Notification> {
    let mut notifications: Vec<Notification> = bookings
        .iter()
        .map(|b| {
            Notification::new(
                b.passenger_id(),
                NotificationKind::RideCancelled,
                Some(ride.id),
                format!(
                    "The driver cancelled {}; {} credits were refunded",
                    route(ride),
                    ride.price
                ),
            )
        })
        .collect();

    notifications.push(Notification::new(
        ride.driver_id,
        NotificationKind::RideCancelled,
        Some(ride.id),
        format!(
            "Your ride {} is cancelled; {} passenger(s) refunded",
            route(ride),
            bookings.len()
        ),
    ));
    notifications
}

pub fn ride_started(ride: &Ride, bookings: &[Booking]) -> Vec<Notification> {
    bookings
        .iter()
        .map(|b| {
            Notification::new(
                b.passenger_id(),
                NotificationKind::RideStarted,
                Some(ride.id),
                format!("Your ride {} has started", route(ride)),
            )
        })
        .collect()
}

pub fn ride_finalized(ride: &Ride, bookings: &[Booking], earned: i64) -> Vec<Notification> {
    let mut notifications: Vec<Notification> = bookings
        .iter()
        .map(|b| {
            Notification::new(
                b.passenger_id(),
                NotificationKind::RideFinalized,
                Some(ride.id),
                format!("Your ride {} is over, you can now leave a review", route(ride)),
            )
        })
        .collect();

    notifications.push(Notification::new(
        ride.driver_id,
        NotificationKind::RideFinalized,
        Some(ride.id),
        format!("Your ride {} is over; {} credits were added to your balance", route(ride), earned),
    ));
    notifications
}
