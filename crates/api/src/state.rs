use std::sync::Arc;

use parkspot_advisor::AdvisorClient;
use parkspot_db::store::ParkingStore;
use parkspot_events::EventBus;

use crate::config::ServerConfig;
use crate::engine::ReservationManager;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend (Postgres or in-process).
    pub store: Arc<dyn ParkingStore>,
    pub config: Arc<ServerConfig>,
    /// Session reservations and their countdowns.
    pub reservations: Arc<ReservationManager>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Publishes occupancy and reservation events to live subscribers.
    pub event_bus: Arc<EventBus>,
    /// Prediction service client; `None` when the feature is disabled.
    pub advisor: Option<Arc<AdvisorClient>>,
}
