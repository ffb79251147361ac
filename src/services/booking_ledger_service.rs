//! Libro de reservas
//!
//! Creación y cancelación de reservas, con la política de reembolso según
//! la antelación de la cancelación.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::BusinessRules;
use crate::models::booking::{Booking, BookingStatus, NewBooking};
use crate::models::ride::{Ride, RideStatus};
use crate::models::user::{Role, User};
use crate::repositories::store::{CarpoolStore, StoreTransaction};
use crate::services::authorization_service::{Actor, AuthorizationService};
use crate::services::clock::Clock;
use crate::services::notification_service::{self, NotificationService};
use crate::utils::errors::{forbidden_error, illegal_transition, not_found_error, AppError, AppResult};

/// Resultado de una cancelación de reserva
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationOutcome {
    pub booking: Booking,
    pub refunded: bool,
    pub refund_amount: i64,
    pub refund_deadline: DateTime<Utc>,
}

impl CancellationOutcome {
    pub fn message(&self) -> String {
        if self.refunded {
            format!("Booking cancelled, {} credits refunded", self.refund_amount)
        } else {
            "Late cancellation, no refund".to_string()
        }
    }
}

pub struct BookingLedgerService {
    store: Arc<dyn CarpoolStore>,
    authz: Arc<AuthorizationService>,
    notifier: Arc<NotificationService>,
    clock: Arc<dyn Clock>,
    rules: BusinessRules,
}

impl BookingLedgerService {
    pub fn new(
        store: Arc<dyn CarpoolStore>,
        authz: Arc<AuthorizationService>,
        notifier: Arc<NotificationService>,
        clock: Arc<dyn Clock>,
        rules: BusinessRules,
    ) -> Self {
        Self {
            store,
            authz,
            notifier,
            clock,
            rules,
        }
    }

    /// Límite para cancelar con reembolso: salida menos N días, inclusive
    pub fn refund_deadline(&self, ride: &Ride) -> DateTime<Utc> {
        ride.departure_date_time - self.rules.refund_deadline()
    }

    /// Crea una reserva confirmada dentro de la unidad de trabajo del llamador.
    ///
    /// Ocupa una plaza del trajet y persiste el trajet, pero no mueve créditos:
    /// el débito del pasajero es responsabilidad de quien abre la transacción.
    pub async fn create_booking(
        &self,
        tx: &mut dyn StoreTransaction,
        ride: &mut Ride,
        driver: &User,
        passenger: &User,
        actor: &Actor,
    ) -> AppResult<Booking> {
        self.authz.require_any_role(
            actor,
            &[Role::Passenger, Role::Employee, Role::Admin],
            "create booking",
        )?;

        if tx.has_active_booking(passenger.id, ride.id).await? {
            return Err(AppError::DuplicateBooking);
        }
        if !ride.has_available_seat() {
            return Err(AppError::RideFull);
        }
        if ride.status() != RideStatus::Disponible {
            return Err(illegal_transition(ride.status(), "booked"));
        }

        let now = self.clock.now();
        let new_booking = NewBooking::new(ride, passenger, driver, now)?;
        let booking = tx.insert_booking(&new_booking).await?;

        ride.decrement_available_seats(now)?;
        tx.update_ride(ride).await?;

        tracing::debug!(
            booking_id = %booking.id,
            ride_id = %ride.id,
            seats_left = ride.available_seats(),
            "Reserva creada"
        );
        Ok(booking)
    }

    /// Cancela una reserva y aplica la política de reembolso
    #[tracing::instrument(skip(self))]
    pub async fn cancel_booking(
        &self,
        booking_id: Uuid,
        passenger_id: Uuid,
        caller: Uuid,
    ) -> AppResult<CancellationOutcome> {
        let actor = self.authz.resolve(caller).await?;

        // lectura previa sin bloqueo para conocer el trajet: el orden de
        // bloqueo es siempre trajet, reserva, usuarios
        let snapshot = self
            .store
            .find_booking(booking_id)
            .await?
            .ok_or_else(|| not_found_error("Booking", &booking_id.to_string()))?;

        self.authz
            .require_self_or_staff(&actor, snapshot.passenger_id(), "cancel booking")?;
        if snapshot.passenger_id() != passenger_id {
            return Err(forbidden_error(
                "cancel booking",
                "booking does not belong to this passenger",
            ));
        }

        let mut tx = self.store.begin().await?;

        let mut ride = tx
            .lock_ride(snapshot.ride_id())
            .await?
            .ok_or_else(|| not_found_error("Ride", &snapshot.ride_id().to_string()))?;
        let mut booking = tx
            .lock_booking(booking_id)
            .await?
            .ok_or_else(|| not_found_error("Booking", &booking_id.to_string()))?;

        match booking.status() {
            BookingStatus::Cancelled => return Err(AppError::AlreadyCancelled),
            BookingStatus::Past => return Err(illegal_transition(BookingStatus::Past, BookingStatus::Cancelled)),
            BookingStatus::Confirmed => {}
        }

        let now = self.clock.now();
        booking.set_status(BookingStatus::Cancelled, now);
        tx.update_booking(&booking).await?;

        ride.increment_available_seats(now)?;
        tx.update_ride(&ride).await?;

        let refund_deadline = self.refund_deadline(&ride);
        let refunded = now <= refund_deadline;

        if refunded {
            let mut passenger = tx
                .lock_user(booking.passenger_id())
                .await?
                .ok_or_else(|| not_found_error("User", &booking.passenger_id().to_string()))?;
            passenger.credit(ride.price)?;
            tx.update_user_credits(&passenger).await?;
        }

        tx.commit().await?;

        let refund_amount = if refunded { ride.price } else { 0 };
        tracing::info!(
            ride_id = %ride.id,
            refunded,
            refund_amount,
            "❌ Reserva cancelada"
        );

        self.notifier
            .dispatch(notification_service::booking_cancelled(&ride, &booking, refunded))
            .await;

        Ok(CancellationOutcome {
            booking,
            refunded,
            refund_amount,
            refund_deadline,
        })
    }
}
