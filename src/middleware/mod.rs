//! Middleware del sistema
//!
//! Este módulo contiene la autenticación del llamador y la configuración
//! de CORS.

pub mod auth;
pub mod cors;

pub use auth::CallerIdentity;
pub use cors::cors_layer;
