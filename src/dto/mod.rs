//! DTOs de la API
//!
//! Cuerpos y queries de las peticiones HTTP, validados con `validator`.

pub mod api_response;
pub mod booking_dto;
pub mod review_dto;
pub mod ride_dto;

pub use api_response::ApiResponse;
