//! Rutas HTTP
//!
//! Cada módulo expone su sub-router; `create_router` los monta bajo `/api`
//! y aplica las capas comunes (trazas, compresión, CORS).

pub mod admin_routes;
pub mod booking_routes;
pub mod history_routes;
pub mod notification_routes;
pub mod review_routes;
pub mod ride_routes;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::cors_layer;
use crate::state::AppState;

/// Peticiones concurrentes máximas por instancia
const MAX_CONCURRENT_REQUESTS: usize = 1024;

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/rides", ride_routes::create_ride_router())
        .nest("/bookings", booking_routes::create_booking_router())
        .nest("/drivers", history_routes::create_driver_router())
        .nest("/passengers", history_routes::create_passenger_router())
        .nest("/admin", admin_routes::create_admin_router())
        .nest("/reviews", review_routes::create_review_router())
        .nest("/notifications", notification_routes::create_notification_router());

    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
