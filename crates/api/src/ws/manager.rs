use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use parkspot_core::types::{SessionKey, Timestamp};
use tokio::sync::{mpsc, RwLock};

/// Outbound half of a socket's message queue.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// One live-feed socket.
pub struct WsConnection {
    /// Session whose personal notices this socket receives, if any.
    pub session_id: Option<SessionKey>,
    pub sender: WsSender,
    pub connected_at: Timestamp,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<String, WsConnection>,
    /// Connection ids per session; a session may have several tabs open.
    by_session: HashMap<SessionKey, HashSet<String>>,
}

impl Registry {
    fn detach(&mut self, conn_id: &str) -> Option<WsConnection> {
        let conn = self.connections.remove(conn_id)?;
        if let Some(session) = conn.session_id.as_deref() {
            if let Some(ids) = self.by_session.get_mut(session) {
                ids.remove(conn_id);
                if ids.is_empty() {
                    self.by_session.remove(session);
                }
            }
        }
        Some(conn)
    }
}

/// Registry of live-feed sockets, shared through `Arc`.
pub struct WsManager {
    inner: RwLock<Registry>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Registry::default()),
        }
    }

    /// Register a socket and return the queue its writer task drains.
    ///
    /// Re-using a connection id replaces the earlier socket.
    pub async fn add(
        &self,
        conn_id: String,
        session_id: Option<SessionKey>,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (sender, rx) = mpsc::unbounded_channel();
        let mut registry = self.inner.write().await;

        registry.detach(&conn_id);
        if let Some(session) = &session_id {
            registry
                .by_session
                .entry(session.clone())
                .or_default()
                .insert(conn_id.clone());
        }
        registry.connections.insert(
            conn_id,
            WsConnection {
                session_id,
                sender,
                connected_at: chrono::Utc::now(),
            },
        );
        rx
    }

    pub async fn remove(&self, conn_id: &str) {
        self.inner.write().await.detach(conn_id);
    }

    /// Queue `message` on every socket. Closed queues are skipped; their
    /// reader loop removes them.
    pub async fn broadcast(&self, message: Message) {
        let registry = self.inner.read().await;
        for conn in registry.connections.values() {
            let _ = conn.sender.send(message.clone());
        }
    }

    /// Queue `message` on the sockets of one session and return how many
    /// accepted it.
    pub async fn send_to_session(&self, session_id: &str, message: Message) -> usize {
        let registry = self.inner.read().await;
        let Some(ids) = registry.by_session.get(session_id) else {
            return 0;
        };
        ids.iter()
            .filter_map(|id| registry.connections.get(id))
            .filter(|conn| conn.sender.send(message.clone()).is_ok())
            .count()
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    /// Close every socket and forget them all.
    pub async fn shutdown_all(&self) {
        let mut registry = self.inner.write().await;
        let count = registry.connections.len();
        for conn in registry.connections.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        *registry = Registry::default();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Heartbeat: ping every socket.
    pub async fn ping_all(&self) {
        self.broadcast(Message::Ping(Bytes::new())).await;
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
