use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parkspot_advisor::AdvisorClient;
use parkspot_db::seed::sample_locations;
use parkspot_db::store::{MemoryStore, ParkingStore, PgStore};
use parkspot_events::EventBus;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parkspot_api::config::ServerConfig;
use parkspot_api::engine::ReservationManager;
use parkspot_api::notifications::NotificationRouter;
use parkspot_api::router::build_app_router;
use parkspot_api::state::AppState;
use parkspot_api::ws;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parkspot_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Storage ---
    let store = build_store(&config).await;
    if config.seed_sample_locations {
        seed_if_empty(store.as_ref()).await;
    }

    // --- Event bus and live feed ---
    let event_bus = Arc::new(EventBus::default());
    let ws_manager = Arc::new(ws::WsManager::new());
    let background_cancel = CancellationToken::new();

    let heartbeat_handle =
        ws::start_heartbeat(Arc::clone(&ws_manager), background_cancel.clone());

    let router_handle = {
        let notification_router = NotificationRouter::new(Arc::clone(&ws_manager));
        let rx = event_bus.subscribe();
        tokio::spawn(async move { notification_router.run(rx).await })
    };
    tracing::info!("Notification router started");

    // --- Advisor ---
    let advisor = config.advisor_url.as_deref().and_then(|url| {
        match AdvisorClient::new(url, Duration::from_secs(config.advisor_timeout_secs)) {
            Ok(client) => {
                tracing::info!(base_url = %client.base_url(), "Prediction service enabled");
                Some(Arc::new(client))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build advisor client, predictions disabled");
                None
            }
        }
    });
    if advisor.is_none() {
        tracing::info!("Prediction service not configured");
    }

    // --- Reservations ---
    let reservations = Arc::new(ReservationManager::new(
        Arc::clone(&store),
        Arc::clone(&event_bus),
        config.reservation_hold_secs,
    ));
    if let Err(e) = reservations.restore().await {
        tracing::error!(error = %e, "Failed to restore reservations, starting empty");
    }

    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        reservations: Arc::clone(&reservations),
        ws_manager: Arc::clone(&ws_manager),
        event_bus: Arc::clone(&event_bus),
        advisor,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);

    // Countdowns stop; persisted reservations are restored on next start.
    reservations.shutdown();
    drop(reservations);
    tracing::info!("Reservation countdowns stopped");

    // Dropping the last bus handle closes the channel and ends the router.
    drop(event_bus);
    let _ = tokio::time::timeout(shutdown_timeout, router_handle).await;
    tracing::info!("Notification router stopped");

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    background_cancel.cancel();
    let _ = tokio::time::timeout(shutdown_timeout, heartbeat_handle).await;
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Postgres when `DATABASE_URL` is set, otherwise the in-process store.
async fn build_store(config: &ServerConfig) -> Arc<dyn ParkingStore> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, using in-memory store (state is lost on restart)");
        return Arc::new(MemoryStore::new());
    };

    let pool = parkspot_db::create_pool(database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    parkspot_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    parkspot_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    Arc::new(PgStore::new(pool))
}

/// Populate an empty store with the sample locations.
async fn seed_if_empty(store: &dyn ParkingStore) {
    match store.list_locations().await {
        Ok(existing) if !existing.is_empty() => {
            tracing::debug!(count = existing.len(), "Store already has locations, skipping seed");
        }
        Ok(_) => {
            for input in sample_locations() {
                match store.create_location(&input).await {
                    Ok(location) => tracing::info!(
                        location_id = %location.id,
                        name = %location.name,
                        "Seeded location"
                    ),
                    Err(e) => {
                        tracing::error!(error = %e, name = %input.name, "Failed to seed location")
                    }
                }
            }
        }
        Err(e) => tracing::error!(error = %e, "Failed to check store before seeding"),
    }
}

/// Wait for SIGINT (Ctrl-C) or SIGTERM to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
