//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. Aquí se ensamblan los servicios con sus
//! puertos (almacén, notificaciones, reloj).

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::store::CarpoolStore;
use crate::services::authorization_service::{AuthorizationService, StoreRoleOracle};
use crate::services::booking_ledger_service::BookingLedgerService;
use crate::services::clock::Clock;
use crate::services::notification_service::{NotificationService, NotificationSink};
use crate::services::review_service::ReviewService;
use crate::services::ride_lifecycle_service::RideLifecycleService;
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub jwt: JwtConfig,
    pub store: Arc<dyn CarpoolStore>,
    pub rides: Arc<RideLifecycleService>,
    pub bookings: Arc<BookingLedgerService>,
    pub reviews: Arc<ReviewService>,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        store: Arc<dyn CarpoolStore>,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let rules = config.rules;
        let authz = Arc::new(AuthorizationService::new(Arc::new(StoreRoleOracle::new(
            store.clone(),
        ))));
        let notifier = Arc::new(NotificationService::new(sink));

        let bookings = Arc::new(BookingLedgerService::new(
            store.clone(),
            authz.clone(),
            notifier.clone(),
            clock.clone(),
            rules,
        ));
        let rides = Arc::new(RideLifecycleService::new(
            store.clone(),
            authz.clone(),
            bookings.clone(),
            notifier,
            clock.clone(),
            rules,
        ));
        let reviews = Arc::new(ReviewService::new(store.clone(), authz, clock));

        Self {
            jwt: JwtConfig::from(&config),
            config,
            store,
            rides,
            bookings,
            reviews,
        }
    }
}
