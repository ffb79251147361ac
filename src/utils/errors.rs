//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid relationship: {0}")]
    InvalidRelationship(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Illegal transition from {from} to {to}")]
    IllegalTransition { from: String, to: String },

    #[error("Passenger already holds an active booking on this ride")]
    DuplicateBooking,

    #[error("Ride has no available seat")]
    RideFull,

    #[error("Booking is already cancelled")]
    AlreadyCancelled,

    #[error("Insufficient credits: {available} available, {required} required")]
    InsufficientCredits { required: i64, available: i64 },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorBody,
}

impl AppError {
    /// Código HTTP asociado a cada tipo de error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::InvalidRelationship(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::IllegalTransition { .. }
            | AppError::DuplicateBooking
            | AppError::RideFull
            | AppError::AlreadyCancelled
            | AppError::InsufficientCredits { .. }
            | AppError::InvariantViolation(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Código estable expuesto al cliente
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DB_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::InvalidRelationship(_) => "INVALID_RELATIONSHIP",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::IllegalTransition { .. } => "ILLEGAL_TRANSITION",
            AppError::DuplicateBooking => "DUPLICATE_BOOKING",
            AppError::RideFull => "RIDE_FULL",
            AppError::AlreadyCancelled => "ALREADY_CANCELLED",
            AppError::InsufficientCredits { .. } => "INSUFFICIENT_CREDITS",
            AppError::InvariantViolation(_) => "INVARIANT_VIOLATION",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Todos los errores que terminan en 409
    pub fn is_conflict(&self) -> bool {
        self.status_code() == StatusCode::CONFLICT
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let (message, details) = match &self {
            // Los errores internos se registran pero nunca se devuelven tal cual
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                ("An error occurred while accessing the database".to_string(), None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("An unexpected error occurred".to_string(), None)
            }
            AppError::Validation(e) => {
                tracing::debug!("Validation error: {}", e);
                ("The provided data is invalid".to_string(), Some(json!(e)))
            }
            AppError::InsufficientCredits { required, available } => {
                tracing::debug!("Insufficient credits: {} < {}", available, required);
                (
                    self.to_string(),
                    Some(json!({ "required": required, "available": available })),
                )
            }
            other => {
                tracing::debug!("Request rejected ({}): {}", code, other);
                (other.to_string(), None)
            }
        };

        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación
pub fn validation_error(field: &'static str, message: &'static str) -> AppError {
    use validator::ValidationError;

    let mut error = ValidationError::new("custom");
    error.add_param("message".into(), &message);

    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);

    AppError::Validation(errors)
}

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(operation: &str, reason: &str) -> AppError {
    AppError::Forbidden(format!("Cannot {}: {}", operation, reason))
}

/// Función helper para crear errores de transición ilegal
pub fn illegal_transition<F: std::fmt::Display, T: std::fmt::Display>(from: F, to: T) -> AppError {
    AppError::IllegalTransition {
        from: from.to_string(),
        to: to.to_string(),
    }
}

/// Función helper para crear errores internos
pub fn internal_error(message: &str) -> AppError {
    AppError::Internal(message.to_string())
}
