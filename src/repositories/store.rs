//! Puerto de persistencia
//!
//! `CarpoolStore` expone lecturas sin bloqueo y abre unidades de trabajo.
//! Todo lo escrito a través de una `StoreTransaction` se aplica en `commit`
//! o se descarta al soltar la transacción.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::booking::{Booking, NewBooking, PassengerRide};
use crate::models::notification::{Notification, StoredNotification};
use crate::models::review::{NewReview, Review};
use crate::models::ride::{NewRide, Ride, RideSearch};
use crate::models::stats::DailyStat;
use crate::models::user::User;
use crate::utils::errors::AppResult;

#[async_trait]
pub trait CarpoolStore: Send + Sync {
    /// Abre una unidad de trabajo atómica
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>>;

    async fn find_ride(&self, ride_id: Uuid) -> AppResult<Option<Ride>>;

    async fn find_user(&self, user_id: Uuid) -> AppResult<Option<User>>;

    async fn find_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>>;

    /// Trajets de un conductor ordenados por fecha de salida
    async fn rides_by_driver(&self, driver_id: Uuid) -> AppResult<Vec<Ride>>;

    /// Reservas de un pasajero con su trajet, ordenadas por fecha de salida
    async fn rides_by_passenger(&self, passenger_id: Uuid) -> AppResult<Vec<PassengerRide>>;

    async fn search_rides(&self, search: &RideSearch) -> AppResult<Vec<Ride>>;

    /// Número de trajets publicados por día, límites incluidos
    async fn daily_ride_counts(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<DailyStat>>;

    /// Comisión cobrada por día, límites incluidos
    async fn daily_commission(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<DailyStat>>;

    async fn pending_reviews(&self) -> AppResult<Vec<Review>>;

    async fn push_notification(&self, notification: &Notification) -> AppResult<()>;

    async fn notifications_for(&self, user_id: Uuid) -> AppResult<Vec<StoredNotification>>;
}

/// Unidad de trabajo; las lecturas `lock_*` bloquean la fila hasta el final
#[async_trait]
pub trait StoreTransaction: Send {
    async fn lock_ride(&mut self, ride_id: Uuid) -> AppResult<Option<Ride>>;

    async fn lock_user(&mut self, user_id: Uuid) -> AppResult<Option<User>>;

    /// Bloquea varios usuarios siempre en el mismo orden (por id)
    async fn lock_users(&mut self, user_ids: &[Uuid]) -> AppResult<Vec<User>>;

    async fn lock_booking(&mut self, booking_id: Uuid) -> AppResult<Option<Booking>>;

    async fn lock_review(&mut self, review_id: Uuid) -> AppResult<Option<Review>>;

    async fn confirmed_bookings_for_ride(&mut self, ride_id: Uuid) -> AppResult<Vec<Booking>>;

    async fn has_active_booking(&mut self, passenger_id: Uuid, ride_id: Uuid) -> AppResult<bool>;

    async fn review_exists_for_booking(&mut self, booking_id: Uuid) -> AppResult<bool>;

    async fn insert_ride(&mut self, new_ride: &NewRide) -> AppResult<Ride>;

    async fn update_ride(&mut self, ride: &Ride) -> AppResult<()>;

    async fn insert_booking(&mut self, new_booking: &NewBooking) -> AppResult<Booking>;

    async fn update_booking(&mut self, booking: &Booking) -> AppResult<()>;

    async fn update_user_credits(&mut self, user: &User) -> AppResult<()>;

    async fn insert_review(&mut self, new_review: &NewReview) -> AppResult<Review>;

    async fn update_review(&mut self, review: &Review) -> AppResult<()>;

    async fn commit(self: Box<Self>) -> AppResult<()>;
}
