//! Modelo de Ride (trajet)
//!
//! Un trajet publicado por un conductor. Este módulo es el único dueño
//! del inventario de plazas y de la máquina de estados del trajet.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::utils::errors::{illegal_transition, validation_error, AppError, AppResult};

/// Precio máximo de una plaza, en créditos
pub const MAX_RIDE_PRICE: i64 = 1_000_000;

/// Estado del trajet - mapea al ENUM ride_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "ride_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Disponible,
    Complet,
    Annule,
    EnCours,
    Termine,
}

impl std::fmt::Display for RideStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Disponible => "disponible",
            RideStatus::Complet => "complet",
            RideStatus::Annule => "annule",
            RideStatus::EnCours => "en_cours",
            RideStatus::Termine => "termine",
        }
    }

    /// Transiciones permitidas por la máquina de estados
    pub fn can_transition_to(self, next: RideStatus) -> bool {
        use RideStatus::*;
        matches!(
            (self, next),
            (Disponible, Complet)
                | (Complet, Disponible)
                | (Disponible, Annule)
                | (Complet, Annule)
                | (Disponible, EnCours)
                | (Complet, EnCours)
                | (EnCours, Termine)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RideStatus::Annule | RideStatus::Termine)
    }

    /// Trajets que todavía no han terminado
    pub fn is_upcoming(self) -> bool {
        matches!(
            self,
            RideStatus::Disponible | RideStatus::Complet | RideStatus::EnCours
        )
    }
}

/// Trajet principal - mapea exactamente a la tabla rides
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    #[serde(rename = "rideId")]
    pub id: Uuid,
    pub driver_id: Uuid,
    pub departure_place: String,
    pub arrival_place: String,
    pub departure_date_time: DateTime<Utc>,
    pub arrival_date_time: DateTime<Utc>,
    pub price: i64,
    pub total_seats: i32,
    available_seats: i32,
    status: RideStatus,
    pub commission: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ride {
    /// Materializa un trajet recién insertado con el id asignado por el almacén
    pub fn from_new(id: Uuid, new_ride: &NewRide) -> Self {
        Self {
            id,
            driver_id: new_ride.driver_id,
            departure_place: new_ride.departure_place.clone(),
            arrival_place: new_ride.arrival_place.clone(),
            departure_date_time: new_ride.departure_date_time,
            arrival_date_time: new_ride.arrival_date_time,
            price: new_ride.price,
            total_seats: new_ride.total_seats,
            available_seats: new_ride.total_seats,
            status: RideStatus::Disponible,
            commission: new_ride.commission,
            created_at: new_ride.created_at,
            updated_at: new_ride.created_at,
        }
    }

    pub fn status(&self) -> RideStatus {
        self.status
    }

    pub fn available_seats(&self) -> i32 {
        self.available_seats
    }

    pub fn has_available_seat(&self) -> bool {
        self.available_seats > 0
    }

    /// Ocupa una plaza. Al llegar a cero el trajet pasa a `Complet`.
    pub fn decrement_available_seats(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        if self.available_seats == 0 {
            return Err(AppError::InvariantViolation(format!(
                "ride {} has no seat left to take",
                self.id
            )));
        }

        self.available_seats -= 1;
        if self.available_seats == 0 && self.status == RideStatus::Disponible {
            self.status = RideStatus::Complet;
        }
        self.touch(now);
        Ok(())
    }

    /// Libera una plaza. Un trajet `Complet` vuelve a `Disponible`.
    pub fn increment_available_seats(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        if self.available_seats >= self.total_seats {
            return Err(AppError::InvariantViolation(format!(
                "ride {} already has all {} seats free",
                self.id, self.total_seats
            )));
        }

        self.available_seats += 1;
        if self.status == RideStatus::Complet {
            self.status = RideStatus::Disponible;
        }
        self.touch(now);
        Ok(())
    }

    pub fn set_status(&mut self, next: RideStatus, now: DateTime<Utc>) -> AppResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(illegal_transition(self.status, next));
        }

        self.status = next;
        self.touch(now);
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Datos de un trajet tal como los envía el conductor
#[derive(Debug, Clone)]
pub struct RideDraft {
    pub departure_place: String,
    pub arrival_place: String,
    pub departure_date_time: DateTime<Utc>,
    pub arrival_date_time: DateTime<Utc>,
    pub price: i64,
    pub available_seats: i32,
}

/// Trajet validado, listo para ser insertado
#[derive(Debug, Clone)]
pub struct NewRide {
    pub driver_id: Uuid,
    pub departure_place: String,
    pub arrival_place: String,
    pub departure_date_time: DateTime<Utc>,
    pub arrival_date_time: DateTime<Utc>,
    pub price: i64,
    pub total_seats: i32,
    pub commission: i64,
    pub created_at: DateTime<Utc>,
}

impl NewRide {
    pub fn new(
        driver_id: Uuid,
        draft: RideDraft,
        commission: i64,
        max_seats: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let departure_place = draft.departure_place.trim().to_string();
        let arrival_place = draft.arrival_place.trim().to_string();

        if departure_place.is_empty() {
            return Err(validation_error("departurePlace", "departure place is required"));
        }
        if arrival_place.is_empty() {
            return Err(validation_error("arrivalPlace", "arrival place is required"));
        }
        if draft.arrival_date_time <= draft.departure_date_time {
            return Err(validation_error(
                "arrivalDateTime",
                "arrival must be after departure",
            ));
        }
        if draft.departure_date_time <= now {
            return Err(validation_error(
                "departureDateTime",
                "departure must be in the future",
            ));
        }
        if draft.price < 0 {
            return Err(validation_error("price", "price cannot be negative"));
        }
        if draft.price > MAX_RIDE_PRICE {
            return Err(validation_error("price", "price exceeds the allowed maximum"));
        }
        if draft.available_seats < 1 || draft.available_seats > max_seats {
            return Err(validation_error(
                "availableSeats",
                "seat count out of the allowed range",
            ));
        }

        Ok(Self {
            driver_id,
            departure_place,
            arrival_place,
            departure_date_time: draft.departure_date_time,
            arrival_date_time: draft.arrival_date_time,
            price: draft.price,
            total_seats: draft.available_seats,
            commission,
            created_at: now,
        })
    }
}

/// Igualdad sin distinguir mayúsculas, también fuera de ASCII ("Évry" == "évry")
fn same_place(stored: &str, wanted: &str) -> bool {
    stored.to_lowercase() == wanted.trim().to_lowercase()
}

/// Criterios de búsqueda de trajets
#[derive(Debug, Clone)]
pub struct RideSearch {
    pub departure_place: String,
    pub arrival_place: String,
    pub date: NaiveDate,
    pub max_price: Option<i64>,
}

impl RideSearch {
    /// Comprueba si un trajet cumple los criterios (usado por el almacén en memoria)
    pub fn matches(&self, ride: &Ride) -> bool {
        ride.status() == RideStatus::Disponible
            && ride.has_available_seat()
            && same_place(&ride.departure_place, &self.departure_place)
            && same_place(&ride.arrival_place, &self.arrival_place)
            && ride.departure_date_time.date_naive() == self.date
            && self.max_price.map_or(true, |max| ride.price <= max)
    }
}
