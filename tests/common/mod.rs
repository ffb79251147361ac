#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use carpool_marketplace::config::EnvironmentConfig;
use carpool_marketplace::models::booking::Booking;
use carpool_marketplace::models::notification::Notification;
use carpool_marketplace::models::ride::{Ride, RideDraft};
use carpool_marketplace::models::user::{Role, User};
use carpool_marketplace::repositories::{CarpoolStore, MemoryStore};
use carpool_marketplace::services::clock::FixedClock;
use carpool_marketplace::services::notification_service::{NotificationSink, RecordingNotificationSink};
use carpool_marketplace::state::AppState;
use carpool_marketplace::utils::errors::{AppError, AppResult};

/// Sink que siempre falla
pub struct FailingNotificationSink;

#[async_trait]
impl NotificationSink for FailingNotificationSink {
    async fn deliver(&self, _notification: &Notification) -> AppResult<()> {
        Err(AppError::Internal("notification backend unavailable".to_string()))
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 6, 1, 8, 0, 0).unwrap()
}

pub struct TestApp {
    pub store: MemoryStore,
    pub clock: Arc<FixedClock>,
    pub sink: Arc<RecordingNotificationSink>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let sink = Arc::new(RecordingNotificationSink::new());
        Self::build(sink.clone(), sink)
    }

    /// Aplicación cuyas notificaciones fallan siempre
    pub fn with_failing_notifications() -> Self {
        Self::build(
            Arc::new(FailingNotificationSink),
            Arc::new(RecordingNotificationSink::new()),
        )
    }

    fn build(sink: Arc<dyn NotificationSink>, recorder: Arc<RecordingNotificationSink>) -> Self {
        let store = MemoryStore::new();
        let clock = Arc::new(FixedClock::new(start_time()));
        let state = AppState::new(
            EnvironmentConfig::default(),
            Arc::new(store.clone()),
            sink,
            clock.clone(),
        );

        Self {
            store,
            clock,
            sink: recorder,
            state,
        }
    }

    pub async fn user(&self, pseudo: &str, credits: i64, roles: &[Role]) -> User {
        let user = User::new(pseudo, &format!("{}@example.com", pseudo), credits, roles);
        self.store.insert_user(user.clone()).await;
        user
    }

    pub async fn driver(&self, pseudo: &str) -> User {
        self.user(pseudo, 20, &[Role::Driver, Role::Passenger]).await
    }

    pub async fn passenger(&self, pseudo: &str, credits: i64) -> User {
        self.user(pseudo, credits, &[Role::Passenger]).await
    }

    pub async fn admin(&self) -> User {
        self.user("admin", 0, &[Role::Admin]).await
    }

    pub async fn employee(&self) -> User {
        self.user("employee", 0, &[Role::Employee]).await
    }

    pub fn draft(&self, departure: DateTime<Utc>, price: i64, seats: i32) -> RideDraft {
        RideDraft {
            departure_place: "Paris".to_string(),
            arrival_place: "Lyon".to_string(),
            departure_date_time: departure,
            arrival_date_time: departure + Duration::hours(5),
            price,
            available_seats: seats,
        }
    }

    /// Publica un trajet que sale dentro de diez días
    pub async fn publish_ride(&self, driver: &User, price: i64, seats: i32) -> Ride {
        let departure = start_time() + Duration::days(10);
        self.publish_ride_at(driver, departure, price, seats).await
    }

    pub async fn publish_ride_at(&self, driver: &User, departure: DateTime<Utc>, price: i64, seats: i32) -> Ride {
        self.state
            .rides
            .add_ride(self.draft(departure, price, seats), driver.id, driver.id)
            .await
            .unwrap()
    }

    pub async fn book(&self, ride: &Ride, passenger: &User) -> AppResult<Booking> {
        self.state.rides.book_ride(ride.id, passenger.id, passenger.id).await
    }

    pub async fn credits_of(&self, user_id: Uuid) -> i64 {
        self.store.find_user(user_id).await.unwrap().unwrap().credits()
    }

    pub async fn ride(&self, ride_id: Uuid) -> Ride {
        self.store.find_ride(ride_id).await.unwrap().unwrap()
    }

    pub async fn booking(&self, booking_id: Uuid) -> Booking {
        self.store.find_booking(booking_id).await.unwrap().unwrap()
    }

    /// Plazas libres + reservas que ocupan plaza == capacidad
    pub async fn assert_seats_conserved(&self, ride_id: Uuid) {
        let ride = self.ride(ride_id).await;
        let occupied = self
            .store
            .bookings_for_ride(ride_id)
            .await
            .iter()
            .filter(|b| b.is_active())
            .count() as i32;

        assert_eq!(
            ride.available_seats() + occupied,
            ride.total_seats,
            "seat conservation broken for ride {}",
            ride_id
        );
    }
}
