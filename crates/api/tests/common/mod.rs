#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use parkspot_core::types::EntityId;
use parkspot_db::models::location::{CreateLocation, ParkingLocation};
use parkspot_db::models::parked_vehicle::ParkedVehicle;
use parkspot_db::models::reservation::Reservation;
use parkspot_db::store::{MemoryStore, ParkingStore, SpotClaim, StoreError};
use parkspot_events::EventBus;
use serde_json::Value;
use tower::ServiceExt;

use parkspot_api::config::ServerConfig;
use parkspot_api::engine::ReservationManager;
use parkspot_api::router::build_app_router;
use parkspot_api::state::AppState;
use parkspot_api::ws::WsManager;

pub const SESSION: &str = "session-a";
pub const OTHER_SESSION: &str = "session-b";

/// Build a test `ServerConfig` with safe defaults and no external services.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:9002".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        reservation_hold_secs: 900,
        database_url: None,
        advisor_url: None,
        advisor_timeout_secs: 5,
        seed_sample_locations: false,
    }
}

pub fn new_location(name: &str, total_spots: i32, current_fee: f64) -> CreateLocation {
    CreateLocation {
        name: name.to_string(),
        address: format!("{name} Road, Test City"),
        total_spots,
        current_fee,
        image_url: None,
        owner_id: None,
    }
}

/// A memory store holding the given locations, returned in creation order.
pub async fn store_with(inputs: &[CreateLocation]) -> (Arc<MemoryStore>, Vec<ParkingLocation>) {
    let store = Arc::new(MemoryStore::with_locations(inputs).await.unwrap());
    let locations = store.list_locations().await.unwrap();
    (store, locations)
}

/// Application state over `store` with a fresh bus and reservation manager.
pub fn test_state(store: Arc<dyn ParkingStore>) -> AppState {
    let config = test_config();
    let event_bus = Arc::new(EventBus::default());
    let reservations = Arc::new(ReservationManager::new(
        Arc::clone(&store),
        Arc::clone(&event_bus),
        config.reservation_hold_secs,
    ));

    AppState {
        store,
        config: Arc::new(config),
        reservations,
        ws_manager: Arc::new(WsManager::new()),
        event_bus,
        advisor: None,
    }
}

/// The production router and middleware stack over `state`.
pub fn build_test_app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    session: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(session) = session {
        builder = builder.header("x-session-id", session);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, None, Some(body)).await
}

pub async fn session_get(app: Router, uri: &str, session: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(session), None).await
}

pub async fn session_post(app: Router, uri: &str, session: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(session), Some(body)).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Failure injection
// ---------------------------------------------------------------------------

/// How long a record write takes while `slow_writes` is on.
pub const SLOW_WRITE: Duration = Duration::from_secs(60);

/// Memory store whose writes can be made to fail or stall on demand.
#[derive(Default)]
pub struct FailingStore {
    pub inner: MemoryStore,
    /// Stall reservation inserts and ledger appends for [`SLOW_WRITE`].
    pub slow_writes: AtomicBool,
    pub fail_insert_reservation: AtomicBool,
    pub fail_delete_reservation: AtomicBool,
    pub fail_shift: AtomicBool,
    pub fail_append_vehicle: AtomicBool,
}

impl FailingStore {
    pub async fn with_locations(inputs: &[CreateLocation]) -> Self {
        Self {
            inner: MemoryStore::with_locations(inputs).await.unwrap(),
            ..Default::default()
        }
    }

    pub fn set(flag: &AtomicBool, on: bool) {
        flag.store(on, Ordering::SeqCst);
    }

    async fn stall(&self) {
        if self.slow_writes.load(Ordering::SeqCst) {
            tokio::time::sleep(SLOW_WRITE).await;
        }
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(format!("injected {what} failure")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ParkingStore for FailingStore {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.inner.health_check().await
    }

    async fn list_locations(&self) -> Result<Vec<ParkingLocation>, StoreError> {
        self.inner.list_locations().await
    }

    async fn find_location(&self, id: EntityId) -> Result<Option<ParkingLocation>, StoreError> {
        self.inner.find_location(id).await
    }

    async fn create_location(
        &self,
        input: &CreateLocation,
    ) -> Result<ParkingLocation, StoreError> {
        self.inner.create_location(input).await
    }

    async fn claim_spot(&self, id: EntityId) -> Result<SpotClaim, StoreError> {
        self.inner.claim_spot(id).await
    }

    async fn shift_occupancy(
        &self,
        id: EntityId,
        delta: i64,
    ) -> Result<Option<ParkingLocation>, StoreError> {
        Self::check(&self.fail_shift, "shift")?;
        self.inner.shift_occupancy(id, delta).await
    }

    async fn set_occupancy(
        &self,
        id: EntityId,
        requested: i64,
    ) -> Result<Option<ParkingLocation>, StoreError> {
        self.inner.set_occupancy(id, requested).await
    }

    async fn update_fee(
        &self,
        id: EntityId,
        fee: f64,
    ) -> Result<Option<ParkingLocation>, StoreError> {
        self.inner.update_fee(id, fee).await
    }

    async fn insert_reservation(&self, reservation: &Reservation) -> Result<(), StoreError> {
        self.stall().await;
        Self::check(&self.fail_insert_reservation, "insert")?;
        self.inner.insert_reservation(reservation).await
    }

    async fn delete_reservation(&self, id: EntityId) -> Result<bool, StoreError> {
        Self::check(&self.fail_delete_reservation, "delete")?;
        self.inner.delete_reservation(id).await
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>, StoreError> {
        self.inner.list_reservations().await
    }

    async fn append_vehicle(&self, vehicle: &ParkedVehicle) -> Result<ParkedVehicle, StoreError> {
        self.stall().await;
        Self::check(&self.fail_append_vehicle, "append")?;
        self.inner.append_vehicle(vehicle).await
    }

    async fn list_vehicles(
        &self,
        location_id: Option<EntityId>,
    ) -> Result<Vec<ParkedVehicle>, StoreError> {
        self.inner.list_vehicles(location_id).await
    }
}
