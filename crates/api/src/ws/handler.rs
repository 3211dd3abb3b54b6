use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use parkspot_core::types::SessionKey;
use parkspot_db::models::location::LocationOverview;
use parkspot_db::store::ParkingStore;
use parkspot_events::bus::FEED_SNAPSHOT;
use parkspot_events::ParkingEvent;
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;

/// Query parameters accepted on the upgrade request.
#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    /// Session to receive personal reservation notices for.
    pub session_id: Option<SessionKey>,
}

/// `GET /api/v1/ws`: upgrade to the live occupancy feed.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let session_id = params
        .session_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    ws.on_upgrade(move |socket| handle_socket(socket, state, session_id))
}

/// Serve one socket: a snapshot of every location first, then every event
/// queued for it by the notification router. Inbound frames are only
/// watched for Close.
async fn handle_socket(socket: WebSocket, state: AppState, session_id: Option<SessionKey>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let has_session = session_id.is_some();

    // Registered before the snapshot is read so no change falls in between.
    let mut outbound = state.ws_manager.add(conn_id.clone(), session_id).await;
    tracing::info!(conn_id = %conn_id, has_session, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();

    if let Some(snapshot) = snapshot_message(state.store.as_ref()).await {
        if sink.send(snapshot).await.is_err() {
            state.ws_manager.remove(&conn_id).await;
            return;
        }
    }

    let writer_conn_id = conn_id.clone();
    let mut writer = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            if sink.send(message).await.is_err() {
                tracing::debug!(conn_id = %writer_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    let reader = async {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    };

    tokio::select! {
        _ = &mut writer => {}
        () = reader => {}
    }

    state.ws_manager.remove(&conn_id).await;
    writer.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Every location with its occupancy, framed like any other feed event.
async fn snapshot_message(store: &dyn ParkingStore) -> Option<Message> {
    let locations: Vec<LocationOverview> = match store.list_locations().await {
        Ok(locations) => locations.into_iter().map(LocationOverview::from).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load feed snapshot");
            return None;
        }
    };

    let event = ParkingEvent::new(FEED_SNAPSHOT).with_payload(json!({ "locations": locations }));
    match serde_json::to_string(&event) {
        Ok(text) => Some(Message::Text(text.into())),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode feed snapshot");
            None
        }
    }
}
