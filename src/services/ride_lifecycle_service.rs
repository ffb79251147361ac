//! Ciclo de vida de los trajets
//!
//! Publicación, reserva, cancelación, salida y finalización de trajets,
//! historiales por rol y estadísticas de administración. Cada operación de
//! escritura es una sola unidad de trabajo; las notificaciones salen después
//! del commit.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::config::BusinessRules;
use crate::models::booking::{Booking, BookingStatus, PassengerRide};
use crate::models::ride::{NewRide, Ride, RideDraft, RideSearch, RideStatus};
use crate::models::stats::PeriodStats;
use crate::models::user::{Role, User};
use crate::repositories::store::{CarpoolStore, StoreTransaction};
use crate::services::authorization_service::{Actor, AuthorizationService};
use crate::services::booking_ledger_service::BookingLedgerService;
use crate::services::clock::Clock;
use crate::services::notification_service::{self, NotificationService};
use crate::utils::errors::{forbidden_error, not_found_error, validation_error, AppError, AppResult};

/// Filtro temporal de los historiales
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryScope {
    All,
    Upcoming,
    Past,
}

impl HistoryScope {
    fn includes_ride(self, ride: &Ride) -> bool {
        match self {
            HistoryScope::All => true,
            HistoryScope::Upcoming => ride.status().is_upcoming(),
            HistoryScope::Past => ride.status().is_terminal(),
        }
    }

    fn includes_booking(self, booking: &Booking) -> bool {
        match self {
            HistoryScope::All => true,
            HistoryScope::Upcoming => booking.status() == BookingStatus::Confirmed,
            HistoryScope::Past => matches!(
                booking.status(),
                BookingStatus::Cancelled | BookingStatus::Past
            ),
        }
    }
}

/// Resultado de finalizar un trajet
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeOutcome {
    pub ride: Ride,
    pub completed_bookings: usize,
    pub driver_earnings: i64,
}

pub struct RideLifecycleService {
    store: Arc<dyn CarpoolStore>,
    authz: Arc<AuthorizationService>,
    ledger: Arc<BookingLedgerService>,
    notifier: Arc<NotificationService>,
    clock: Arc<dyn Clock>,
    rules: BusinessRules,
}

async fn lock_ride(tx: &mut dyn StoreTransaction, ride_id: Uuid) -> AppResult<Ride> {
    tx.lock_ride(ride_id)
        .await?
        .ok_or_else(|| not_found_error("Ride", &ride_id.to_string()))
}

fn take_user(users: &[User], user_id: Uuid) -> AppResult<User> {
    users
        .iter()
        .find(|u| u.id == user_id)
        .cloned()
        .ok_or_else(|| not_found_error("User", &user_id.to_string()))
}

impl RideLifecycleService {
    pub fn new(
        store: Arc<dyn CarpoolStore>,
        authz: Arc<AuthorizationService>,
        ledger: Arc<BookingLedgerService>,
        notifier: Arc<NotificationService>,
        clock: Arc<dyn Clock>,
        rules: BusinessRules,
    ) -> Self {
        Self {
            store,
            authz,
            ledger,
            notifier,
            clock,
            rules,
        }
    }

    /// Solo el conductor del trajet, y en su propio nombre
    fn require_ride_driver(&self, actor: &Actor, ride: &Ride, driver_id: Uuid, operation: &str) -> AppResult<()> {
        self.authz.require_self(actor, driver_id, operation)?;
        if ride.driver_id != driver_id {
            return Err(forbidden_error(operation, "caller is not the driver of this ride"));
        }
        Ok(())
    }

    /// Publica un trajet y cobra la comisión al conductor
    #[tracing::instrument(skip(self, draft))]
    pub async fn add_ride(&self, draft: RideDraft, driver_id: Uuid, caller: Uuid) -> AppResult<Ride> {
        let actor = self.authz.resolve(caller).await?;
        self.authz.require_self(&actor, driver_id, "add ride")?;
        self.authz.require_role(&actor, Role::Driver, "add ride")?;

        let new_ride = NewRide::new(
            driver_id,
            draft,
            self.rules.ride_commission,
            self.rules.max_seats_per_ride,
            self.clock.now(),
        )?;

        let mut tx = self.store.begin().await?;

        let mut driver = tx
            .lock_user(driver_id)
            .await?
            .ok_or_else(|| not_found_error("User", &driver_id.to_string()))?;
        driver.debit(new_ride.commission)?;
        tx.update_user_credits(&driver).await?;

        let ride = tx.insert_ride(&new_ride).await?;
        tx.commit().await?;

        tracing::info!(
            ride_id = %ride.id,
            commission = ride.commission,
            seats = ride.total_seats,
            "🚗 Trajet publicado"
        );
        self.notifier
            .dispatch(vec![notification_service::ride_published(&ride)])
            .await;

        Ok(ride)
    }

    /// Reserva una plaza: débito del pasajero y reserva en la misma unidad de trabajo
    #[tracing::instrument(skip(self))]
    pub async fn book_ride(&self, ride_id: Uuid, passenger_id: Uuid, caller: Uuid) -> AppResult<Booking> {
        let actor = self.authz.resolve(caller).await?;
        self.authz
            .require_self_or_staff(&actor, passenger_id, "book ride")?;

        let mut tx = self.store.begin().await?;

        let mut ride = lock_ride(tx.as_mut(), ride_id).await?;
        if !ride.has_available_seat() {
            return Err(AppError::RideFull);
        }

        let users = tx.lock_users(&[ride.driver_id, passenger_id]).await?;
        let driver = take_user(&users, ride.driver_id)?;
        let mut passenger = take_user(&users, passenger_id)?;

        passenger.debit(ride.price)?;

        let booking = self
            .ledger
            .create_booking(tx.as_mut(), &mut ride, &driver, &passenger, &actor)
            .await?;
        tx.update_user_credits(&passenger).await?;

        tx.commit().await?;

        tracing::info!(
            booking_id = %booking.id,
            price = ride.price,
            seats_left = ride.available_seats(),
            "🎫 Plaza reservada"
        );
        self.notifier
            .dispatch(notification_service::booking_confirmed(&ride, &booking))
            .await;

        Ok(booking)
    }

    /// Cancelación por el conductor: reembolso íntegro a cada pasajero confirmado
    #[tracing::instrument(skip(self))]
    pub async fn cancel_ride(&self, ride_id: Uuid, driver_id: Uuid, caller: Uuid) -> AppResult<Ride> {
        let actor = self.authz.resolve(caller).await?;

        let mut tx = self.store.begin().await?;
        let mut ride = lock_ride(tx.as_mut(), ride_id).await?;
        self.require_ride_driver(&actor, &ride, driver_id, "cancel ride")?;

        let now = self.clock.now();
        ride.set_status(RideStatus::Annule, now)?;

        let mut bookings = tx.confirmed_bookings_for_ride(ride.id).await?;
        let passenger_ids: Vec<Uuid> = bookings.iter().map(|b| b.passenger_id()).collect();
        let mut passengers = tx.lock_users(&passenger_ids).await?;

        for booking in bookings.iter_mut() {
            booking.set_status(BookingStatus::Cancelled, now);
            tx.update_booking(booking).await?;
            ride.increment_available_seats(now)?;

            let passenger = passengers
                .iter_mut()
                .find(|p| p.id == booking.passenger_id())
                .ok_or_else(|| not_found_error("User", &booking.passenger_id().to_string()))?;
            passenger.credit(ride.price)?;
        }

        for passenger in &passengers {
            tx.update_user_credits(passenger).await?;
        }
        tx.update_ride(&ride).await?;
        tx.commit().await?;

        tracing::info!(
            refunded_bookings = bookings.len(),
            refund_each = ride.price,
            "🚫 Trajet cancelado por el conductor"
        );
        self.notifier
            .dispatch(notification_service::ride_cancelled(&ride, &bookings))
            .await;

        Ok(ride)
    }

    #[tracing::instrument(skip(self))]
    pub async fn start_ride(&self, ride_id: Uuid, driver_id: Uuid, caller: Uuid) -> AppResult<Ride> {
        let actor = self.authz.resolve(caller).await?;

        let mut tx = self.store.begin().await?;
        let mut ride = lock_ride(tx.as_mut(), ride_id).await?;
        self.require_ride_driver(&actor, &ride, driver_id, "start ride")?;

        ride.set_status(RideStatus::EnCours, self.clock.now())?;
        tx.update_ride(&ride).await?;
        let bookings = tx.confirmed_bookings_for_ride(ride.id).await?;
        tx.commit().await?;

        tracing::info!(passengers = bookings.len(), "▶️ Trajet iniciado");
        self.notifier
            .dispatch(notification_service::ride_started(&ride, &bookings))
            .await;

        Ok(ride)
    }

    /// Termina el trajet y paga al conductor el precio de cada reserva confirmada
    #[tracing::instrument(skip(self))]
    pub async fn finalize_ride(&self, ride_id: Uuid, driver_id: Uuid, caller: Uuid) -> AppResult<FinalizeOutcome> {
        let actor = self.authz.resolve(caller).await?;

        let mut tx = self.store.begin().await?;
        let mut ride = lock_ride(tx.as_mut(), ride_id).await?;
        self.require_ride_driver(&actor, &ride, driver_id, "finalize ride")?;

        let now = self.clock.now();
        ride.set_status(RideStatus::Termine, now)?;
        tx.update_ride(&ride).await?;

        let mut bookings = tx.confirmed_bookings_for_ride(ride.id).await?;
        let earnings = driver_earnings(ride.price, bookings.len())?;
        for booking in bookings.iter_mut() {
            booking.set_status(BookingStatus::Past, now);
            tx.update_booking(booking).await?;
        }

        let mut driver = tx
            .lock_user(ride.driver_id)
            .await?
            .ok_or_else(|| not_found_error("User", &ride.driver_id.to_string()))?;
        driver.credit(earnings)?;
        tx.update_user_credits(&driver).await?;

        tx.commit().await?;

        tracing::info!(
            completed_bookings = bookings.len(),
            earnings,
            "🏁 Trajet finalizado"
        );
        self.notifier
            .dispatch(notification_service::ride_finalized(&ride, &bookings, earnings))
            .await;

        Ok(FinalizeOutcome {
            ride,
            completed_bookings: bookings.len(),
            driver_earnings: earnings,
        })
    }

    /// Trajets de un conductor, visibles para él mismo y para el personal
    pub async fn rides_by_driver(&self, driver_id: Uuid, caller: Uuid, scope: HistoryScope) -> AppResult<Vec<Ride>> {
        let actor = self.authz.resolve(caller).await?;
        self.authz
            .require_self_or_staff(&actor, driver_id, "read driver rides")?;

        let rides = self.store.rides_by_driver(driver_id).await?;
        Ok(rides.into_iter().filter(|r| scope.includes_ride(r)).collect())
    }

    /// Reservas de un pasajero con su trajet
    pub async fn rides_by_passenger(
        &self,
        passenger_id: Uuid,
        caller: Uuid,
        scope: HistoryScope,
    ) -> AppResult<Vec<PassengerRide>> {
        let actor = self.authz.resolve(caller).await?;
        self.authz
            .require_self_or_staff(&actor, passenger_id, "read passenger rides")?;

        let entries = self.store.rides_by_passenger(passenger_id).await?;
        Ok(entries
            .into_iter()
            .filter(|e| scope.includes_booking(&e.booking))
            .collect())
    }

    async fn require_admin(&self, caller: Uuid, operation: &str) -> AppResult<()> {
        let actor = self.authz.resolve(caller).await?;
        self.authz.require_role(&actor, Role::Admin, operation)
    }

    fn check_period(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
        if start > end {
            return Err(validation_error("start", "start date must not be after end date"));
        }
        Ok(())
    }

    pub async fn rides_over_period(&self, start: NaiveDate, end: NaiveDate, caller: Uuid) -> AppResult<PeriodStats> {
        self.require_admin(caller, "view ride statistics").await?;
        Self::check_period(start, end)?;

        let daily = self.store.daily_ride_counts(start, end).await?;
        Ok(PeriodStats::from_daily(start, end, daily))
    }

    pub async fn rides_today(&self, caller: Uuid) -> AppResult<PeriodStats> {
        let today = self.clock.now().date_naive();
        self.rides_over_period(today, today, caller).await
    }

    pub async fn commission_over_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        caller: Uuid,
    ) -> AppResult<PeriodStats> {
        self.require_admin(caller, "view commission statistics").await?;
        Self::check_period(start, end)?;

        let daily = self.store.daily_commission(start, end).await?;
        Ok(PeriodStats::from_daily(start, end, daily))
    }

    pub async fn commission_today(&self, caller: Uuid) -> AppResult<PeriodStats> {
        let today = self.clock.now().date_naive();
        self.commission_over_period(today, today, caller).await
    }

    /// Búsqueda pública de trajets con plazas libres
    pub async fn search_rides(&self, search: RideSearch) -> AppResult<Vec<Ride>> {
        if search.departure_place.trim().is_empty() {
            return Err(validation_error("departure", "departure place is required"));
        }
        if search.arrival_place.trim().is_empty() {
            return Err(validation_error("arrival", "arrival place is required"));
        }

        self.store.search_rides(&search).await
    }

    pub async fn get_ride(&self, ride_id: Uuid) -> AppResult<Ride> {
        self.store
            .find_ride(ride_id)
            .await?
            .ok_or_else(|| not_found_error("Ride", &ride_id.to_string()))
    }
}

/// Precio por reserva confirmada, sin desbordar
fn driver_earnings(price: i64, completed_bookings: usize) -> AppResult<i64> {
    i64::try_from(completed_bookings)
        .ok()
        .and_then(|count| price.checked_mul(count))
        .ok_or_else(|| {
            AppError::InvariantViolation(format!(
                "earnings overflow: {} bookings at {} credits",
                completed_bookings, price
            ))
        })
}
