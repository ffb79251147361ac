use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

// Request para reservar una plaza
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookRideRequest {
    pub ride_id: Uuid,
    pub passenger_id: Uuid,
}

// Request para cancelar una reserva
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CancelBookingRequest {
    pub booking_id: Uuid,
    pub passenger_id: Uuid,
}
