//! Almacén en memoria
//!
//! Usado en desarrollo (`STORAGE_BACKEND=memory`) y en los tests.
//! Las unidades de trabajo se serializan con un mutex asíncrono y trabajan
//! sobre una copia del estado que solo se publica en `commit`.
//!
//! Las lecturas de `CarpoolStore` toman el mismo mutex: no deben llamarse
//! desde una tarea que mantiene abierta una unidad de trabajo.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::models::booking::{Booking, BookingStatus, NewBooking, PassengerRide};
use crate::models::notification::{Notification, StoredNotification};
use crate::models::review::{NewReview, Review, ReviewStatus};
use crate::models::ride::{NewRide, Ride, RideSearch};
use crate::models::stats::DailyStat;
use crate::models::user::User;
use crate::repositories::store::{CarpoolStore, StoreTransaction};
use crate::utils::errors::{not_found_error, AppResult};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    rides: HashMap<Uuid, Ride>,
    bookings: HashMap<Uuid, Booking>,
    reviews: HashMap<Uuid, Review>,
    notifications: Vec<StoredNotification>,
}

impl MemoryState {
    fn daily<F>(&self, start: NaiveDate, end: NaiveDate, value: F) -> Vec<DailyStat>
    where
        F: Fn(&Ride) -> i64,
    {
        let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        for ride in self.rides.values() {
            let day = ride.created_at.date_naive();
            if day >= start && day <= end {
                *per_day.entry(day).or_insert(0) += value(ride);
            }
        }

        per_day
            .into_iter()
            .map(|(day, value)| DailyStat { day, value })
            .collect()
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alta directa de un usuario (el registro de cuentas queda fuera del núcleo)
    pub async fn insert_user(&self, user: User) {
        let mut state = self.state.lock().await;
        state.users.insert(user.id, user);
    }

    /// Todas las reservas de un trajet, en cualquier estado
    pub async fn bookings_for_ride(&self, ride_id: Uuid) -> Vec<Booking> {
        let state = self.state.lock().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| b.ride_id() == ride_id)
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.created_at);
        bookings
    }
}

#[async_trait]
impl CarpoolStore for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }

    async fn find_ride(&self, ride_id: Uuid) -> AppResult<Option<Ride>> {
        Ok(self.state.lock().await.rides.get(&ride_id).cloned())
    }

    async fn find_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&user_id).cloned())
    }

    async fn find_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>> {
        Ok(self.state.lock().await.bookings.get(&booking_id).cloned())
    }

    async fn rides_by_driver(&self, driver_id: Uuid) -> AppResult<Vec<Ride>> {
        let state = self.state.lock().await;
        let mut rides: Vec<Ride> = state
            .rides
            .values()
            .filter(|r| r.driver_id == driver_id)
            .cloned()
            .collect();
        rides.sort_by_key(|r| r.departure_date_time);
        Ok(rides)
    }

    async fn rides_by_passenger(&self, passenger_id: Uuid) -> AppResult<Vec<PassengerRide>> {
        let state = self.state.lock().await;
        let mut entries: Vec<PassengerRide> = state
            .bookings
            .values()
            .filter(|b| b.passenger_id() == passenger_id)
            .filter_map(|b| {
                state.rides.get(&b.ride_id()).map(|ride| PassengerRide {
                    booking: b.clone(),
                    ride: ride.clone(),
                })
            })
            .collect();
        entries.sort_by_key(|e| e.ride.departure_date_time);
        Ok(entries)
    }

    async fn search_rides(&self, search: &RideSearch) -> AppResult<Vec<Ride>> {
        let state = self.state.lock().await;
        let mut rides: Vec<Ride> = state
            .rides
            .values()
            .filter(|r| search.matches(r))
            .cloned()
            .collect();
        rides.sort_by_key(|r| r.departure_date_time);
        Ok(rides)
    }

    async fn daily_ride_counts(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<DailyStat>> {
        Ok(self.state.lock().await.daily(start, end, |_| 1))
    }

    async fn daily_commission(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<DailyStat>> {
        Ok(self.state.lock().await.daily(start, end, |r| r.commission))
    }

    async fn pending_reviews(&self) -> AppResult<Vec<Review>> {
        let state = self.state.lock().await;
        let mut reviews: Vec<Review> = state
            .reviews
            .values()
            .filter(|r| r.status() == ReviewStatus::Pending)
            .cloned()
            .collect();
        reviews.sort_by_key(|r| r.created_at);
        Ok(reviews)
    }

    async fn push_notification(&self, notification: &Notification) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.notifications.push(StoredNotification {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            kind: notification.kind.as_str().to_string(),
            ride_id: notification.ride_id,
            message: notification.message.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn notifications_for(&self, user_id: Uuid) -> AppResult<Vec<StoredNotification>> {
        let state = self.state.lock().await;
        Ok(state
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn lock_ride(&mut self, ride_id: Uuid) -> AppResult<Option<Ride>> {
        Ok(self.working.rides.get(&ride_id).cloned())
    }

    async fn lock_user(&mut self, user_id: Uuid) -> AppResult<Option<User>> {
        Ok(self.working.users.get(&user_id).cloned())
    }

    async fn lock_users(&mut self, user_ids: &[Uuid]) -> AppResult<Vec<User>> {
        let mut ids = user_ids.to_vec();
        ids.sort();
        ids.dedup();
        Ok(ids
            .iter()
            .filter_map(|id| self.working.users.get(id).cloned())
            .collect())
    }

    async fn lock_booking(&mut self, booking_id: Uuid) -> AppResult<Option<Booking>> {
        Ok(self.working.bookings.get(&booking_id).cloned())
    }

    async fn lock_review(&mut self, review_id: Uuid) -> AppResult<Option<Review>> {
        Ok(self.working.reviews.get(&review_id).cloned())
    }

    async fn confirmed_bookings_for_ride(&mut self, ride_id: Uuid) -> AppResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .working
            .bookings
            .values()
            .filter(|b| b.ride_id() == ride_id && b.status() == BookingStatus::Confirmed)
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.created_at);
        Ok(bookings)
    }

    async fn has_active_booking(&mut self, passenger_id: Uuid, ride_id: Uuid) -> AppResult<bool> {
        Ok(self
            .working
            .bookings
            .values()
            .any(|b| b.passenger_id() == passenger_id && b.ride_id() == ride_id && b.is_active()))
    }

    async fn review_exists_for_booking(&mut self, booking_id: Uuid) -> AppResult<bool> {
        Ok(self.working.reviews.values().any(|r| r.booking_id == booking_id))
    }

    async fn insert_ride(&mut self, new_ride: &NewRide) -> AppResult<Ride> {
        let ride = Ride::from_new(Uuid::new_v4(), new_ride);
        self.working.rides.insert(ride.id, ride.clone());
        Ok(ride)
    }

    async fn update_ride(&mut self, ride: &Ride) -> AppResult<()> {
        match self.working.rides.get_mut(&ride.id) {
            Some(slot) => {
                *slot = ride.clone();
                Ok(())
            }
            None => Err(not_found_error("Ride", &ride.id.to_string())),
        }
    }

    async fn insert_booking(&mut self, new_booking: &NewBooking) -> AppResult<Booking> {
        let booking = Booking::from_new(Uuid::new_v4(), new_booking);
        self.working.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn update_booking(&mut self, booking: &Booking) -> AppResult<()> {
        match self.working.bookings.get_mut(&booking.id) {
            Some(slot) => {
                *slot = booking.clone();
                Ok(())
            }
            None => Err(not_found_error("Booking", &booking.id.to_string())),
        }
    }

    async fn update_user_credits(&mut self, user: &User) -> AppResult<()> {
        match self.working.users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(())
            }
            None => Err(not_found_error("User", &user.id.to_string())),
        }
    }

    async fn insert_review(&mut self, new_review: &NewReview) -> AppResult<Review> {
        let review = Review::from_new(Uuid::new_v4(), new_review);
        self.working.reviews.insert(review.id, review.clone());
        Ok(review)
    }

    async fn update_review(&mut self, review: &Review) -> AppResult<()> {
        match self.working.reviews.get_mut(&review.id) {
            Some(slot) => {
                *slot = review.clone();
                Ok(())
            }
            None => Err(not_found_error("Review", &review.id.to_string())),
        }
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
