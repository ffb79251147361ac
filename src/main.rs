use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use carpool_marketplace::config::{DatabaseConfig, EnvironmentConfig, StorageBackend};
use carpool_marketplace::database;
use carpool_marketplace::repositories::{CarpoolStore, MemoryStore, PgStore};
use carpool_marketplace::routes::create_router;
use carpool_marketplace::services::clock::SystemClock;
use carpool_marketplace::services::notification_service::{
    NotificationSink, StoreNotificationSink, TracingNotificationSink,
};
use carpool_marketplace::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🚗 Carpool Marketplace - Ride Lifecycle & Booking Ledger");
    info!("========================================================");

    let config = EnvironmentConfig::from_env()?;
    info!(
        "⚙️ Entorno: {} | comisión: {} créditos | reembolso hasta {} días antes",
        config.environment, config.rules.ride_commission, config.rules.refund_deadline_days
    );

    // Inicializar almacén
    let (store, sink): (Arc<dyn CarpoolStore>, Arc<dyn NotificationSink>) = match config.storage_backend {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = match database::connect(&db_config).await {
                Ok(pool) => pool,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {:#}", e);
                    return Err(e);
                }
            };
            let store: Arc<dyn CarpoolStore> = Arc::new(PgStore::new(pool));
            let sink = Arc::new(StoreNotificationSink::new(store.clone()));
            (store, sink)
        }
        StorageBackend::Memory => {
            info!("🧪 Usando almacén en memoria, los datos se pierden al reiniciar");
            (Arc::new(MemoryStore::new()), Arc::new(TracingNotificationSink))
        }
    };

    let addr: SocketAddr = config.server_url().parse()?;
    let app_state = AppState::new(config, store, sink, Arc::new(SystemClock));
    let app = create_router(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   POST /api/rides | PUT /api/rides/cancel|start|finalize");
    info!("   GET  /api/rides/search | GET /api/rides/:id");
    info!("   POST /api/bookings | PUT /api/bookings/cancel");
    info!("   GET  /api/drivers/:id/rides[/upcoming|/past]");
    info!("   GET  /api/passengers/:id/rides[/upcoming|/past]");
    info!("   GET  /api/admin/stats/rides-today|rides|commission-today|commission");
    info!("   POST /api/reviews | GET /api/reviews/pending | PUT /api/reviews/:id/moderate");
    info!("   GET  /api/notifications");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
