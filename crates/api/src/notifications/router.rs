//! Event-to-socket routing.

use std::sync::Arc;

use axum::extract::ws::Message;
use parkspot_events::ParkingEvent;
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Routes bus events to WebSocket clients.
///
/// Events addressed to a session go only to that session's sockets; all
/// other events are part of the public feed and go to every socket.
pub struct NotificationRouter {
    ws_manager: Arc<WsManager>,
}

impl NotificationRouter {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the main routing loop.
    ///
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](parkspot_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<ParkingEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver a single event.
    pub async fn route_event(&self, event: &ParkingEvent) -> Result<(), serde_json::Error> {
        let text = serde_json::to_string(event)?;
        let message = Message::Text(text.into());

        match event.session_id.as_deref() {
            Some(session) => {
                let delivered = self.ws_manager.send_to_session(session, message).await;
                tracing::debug!(
                    event_type = %event.event_type,
                    delivered,
                    "Session event delivered"
                );
            }
            None => self.ws_manager.broadcast(message).await,
        }
        Ok(())
    }
}
