use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::ride::{RideDraft, RideSearch};
use crate::utils::validation::validate_not_blank;

// Request para publicar un trajet
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddRideRequest {
    pub driver_id: Uuid,
    #[validate(length(max = 255), custom = "validate_not_blank")]
    pub departure_place: String,
    #[validate(length(max = 255), custom = "validate_not_blank")]
    pub arrival_place: String,
    pub departure_date_time: DateTime<Utc>,
    pub arrival_date_time: DateTime<Utc>,
    #[validate(range(min = 0, max = 1_000_000))]
    pub price: i64,
    #[validate(range(min = 1))]
    pub available_seats: i32,
}

impl AddRideRequest {
    pub fn into_parts(self) -> (Uuid, RideDraft) {
        (
            self.driver_id,
            RideDraft {
                departure_place: self.departure_place,
                arrival_place: self.arrival_place,
                departure_date_time: self.departure_date_time,
                arrival_date_time: self.arrival_date_time,
                price: self.price,
                available_seats: self.available_seats,
            },
        )
    }
}

// Request para cancelar, iniciar o finalizar un trajet
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RideActionRequest {
    pub ride_id: Uuid,
    pub driver_id: Uuid,
}

// Query de búsqueda pública
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RideSearchQuery {
    #[validate(custom = "validate_not_blank")]
    pub departure: String,
    #[validate(custom = "validate_not_blank")]
    pub arrival: String,
    pub date: NaiveDate,
    #[validate(range(min = 0))]
    pub max_price: Option<i64>,
}

impl From<RideSearchQuery> for RideSearch {
    fn from(query: RideSearchQuery) -> Self {
        Self {
            departure_place: query.departure,
            arrival_place: query.arrival,
            date: query.date,
            max_price: query.max_price,
        }
    }
}

// Periodo de estadísticas, límites incluidos
#[derive(Debug, Deserialize, Validate)]
pub struct PeriodQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}
