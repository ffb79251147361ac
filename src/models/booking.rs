//! Modelo de Booking (réservation)
//!
//! Una plaza reservada por un pasajero en un trajet. La reserva guarda
//! una copia del conductor del trajet en el momento de reservar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::models::ride::Ride;
use crate::models::user::User;
use crate::utils::errors::{AppError, AppResult};

/// Estado de la reserva - mapea al ENUM booking_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Past,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Past => "past",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Un pasajero nunca puede ser el conductor del trajet que reserva
fn check_relationship(passenger_id: Uuid, driver_id: Uuid, ride_driver_id: Uuid) -> AppResult<()> {
    if passenger_id == driver_id {
        return Err(AppError::InvalidRelationship(
            "passenger and driver must be different users".to_string(),
        ));
    }
    if passenger_id == ride_driver_id {
        return Err(AppError::InvalidRelationship(
            "a driver cannot book their own ride".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "bookingId")]
    pub id: Uuid,
    ride_id: Uuid,
    passenger_id: Uuid,
    driver_id: Uuid,
    status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn from_new(id: Uuid, new_booking: &NewBooking) -> Self {
        Self {
            id,
            ride_id: new_booking.ride_id,
            passenger_id: new_booking.passenger_id,
            driver_id: new_booking.driver_id,
            status: new_booking.status,
            created_at: new_booking.created_at,
            updated_at: new_booking.created_at,
        }
    }

    pub fn ride_id(&self) -> Uuid {
        self.ride_id
    }

    pub fn passenger_id(&self) -> Uuid {
        self.passenger_id
    }

    pub fn driver_id(&self) -> Uuid {
        self.driver_id
    }

    pub fn status(&self) -> BookingStatus {
        self.status
    }

    /// Una reserva no cancelada ocupa una plaza
    pub fn is_active(&self) -> bool {
        self.status != BookingStatus::Cancelled
    }

    pub fn set_status(&mut self, status: BookingStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }

    /// Cambia el trajet; el conductor copiado sigue al nuevo trajet
    pub fn set_ride(&mut self, ride: &Ride, now: DateTime<Utc>) -> AppResult<()> {
        check_relationship(self.passenger_id, ride.driver_id, ride.driver_id)?;
        self.ride_id = ride.id;
        self.driver_id = ride.driver_id;
        self.updated_at = now;
        Ok(())
    }

    pub fn set_passenger(&mut self, passenger: &User, now: DateTime<Utc>) -> AppResult<()> {
        check_relationship(passenger.id, self.driver_id, self.driver_id)?;
        self.passenger_id = passenger.id;
        self.updated_at = now;
        Ok(())
    }

    /// El conductor copiado debe seguir siendo el del trajet reservado
    pub fn set_driver(&mut self, driver: &User, ride: &Ride, now: DateTime<Utc>) -> AppResult<()> {
        if ride.id != self.ride_id {
            return Err(AppError::InvalidRelationship(format!(
                "booking {} does not belong to ride {}",
                self.id, ride.id
            )));
        }
        if driver.id != ride.driver_id {
            return Err(AppError::InvalidRelationship(format!(
                "user {} is not the driver of ride {}",
                driver.id, ride.id
            )));
        }
        check_relationship(self.passenger_id, driver.id, ride.driver_id)?;
        self.driver_id = driver.id;
        self.updated_at = now;
        Ok(())
    }
}

/// Reserva validada, pendiente de inserción
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub ride_id: Uuid,
    pub passenger_id: Uuid,
    pub driver_id: Uuid,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl NewBooking {
    pub fn new(ride: &Ride, passenger: &User, driver: &User, now: DateTime<Utc>) -> AppResult<Self> {
        if driver.id != ride.driver_id {
            return Err(AppError::InvalidRelationship(format!(
                "user {} is not the driver of ride {}",
                driver.id, ride.id
            )));
        }
        check_relationship(passenger.id, driver.id, ride.driver_id)?;

        Ok(Self {
            ride_id: ride.id,
            passenger_id: passenger.id,
            driver_id: driver.id,
            status: BookingStatus::Confirmed,
            created_at: now,
        })
    }
}

/// Reserva junto con su trajet, para el historial del pasajero
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerRide {
    pub booking: Booking,
    pub ride: Ride,
}
