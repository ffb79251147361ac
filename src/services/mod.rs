//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación: el ciclo de
//! vida de los trajets, el libro de reservas y los puertos que consumen
//! (autorización, notificaciones y reloj).

pub mod authorization_service;
pub mod booking_ledger_service;
pub mod clock;
pub mod notification_service;
pub mod review_service;
pub mod ride_lifecycle_service;

pub use authorization_service::{Actor, AuthorizationService, RoleOracle, StoreRoleOracle};
pub use booking_ledger_service::{BookingLedgerService, CancellationOutcome};
pub use clock::{Clock, FixedClock, SystemClock};
pub use notification_service::{
    NotificationService, NotificationSink, RecordingNotificationSink, StoreNotificationSink,
    TracingNotificationSink,
};
pub use review_service::ReviewService;
pub use ride_lifecycle_service::{FinalizeOutcome, HistoryScope, RideLifecycleService};
