//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`ParkingEvent`]s. Every
//! occupancy or reservation change is published here, and live subscribers
//! (WebSocket clients) receive it as it happens.

use chrono::{DateTime, Utc};
use parkspot_core::types::{EntityId, SessionKey};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event type names
// ---------------------------------------------------------------------------

pub const LOCATION_CREATED: &str = "location.created";
pub const LOCATION_OCCUPANCY_CHANGED: &str = "location.occupancy_changed";
pub const LOCATION_FEE_CHANGED: &str = "location.fee_changed";
pub const RESERVATION_CONFIRMED: &str = "reservation.confirmed";
pub const RESERVATION_CANCELLED: &str = "reservation.cancelled";
pub const RESERVATION_EXPIRED: &str = "reservation.expired";
pub const VEHICLE_CHECKED_IN: &str = "vehicle.checked_in";
/// First frame on a new live-feed socket: every location's occupancy.
pub const FEED_SNAPSHOT: &str = "feed.snapshot";

// ---------------------------------------------------------------------------
// ParkingEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred in the service.
///
/// Constructed via [`ParkingEvent::new`] and enriched with
/// [`for_location`](ParkingEvent::for_location),
/// [`for_session`](ParkingEvent::for_session) and
/// [`with_payload`](ParkingEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingEvent {
    /// Dot-separated event name, e.g. `"reservation.confirmed"`.
    pub event_type: String,

    /// Location the event concerns, if any.
    pub location_id: Option<EntityId>,

    /// Session that should receive this event as a personal notice.
    /// `None` means the event is only part of the public live feed.
    pub session_id: Option<SessionKey>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl ParkingEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            location_id: None,
            session_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn for_location(mut self, location_id: EntityId) -> Self {
        self.location_id = Some(location_id);
        self
    }

    pub fn for_session(mut self, session_id: impl Into<SessionKey>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Events buffered per subscriber before the slowest one starts lagging.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out of [`ParkingEvent`]s.
///
/// Publishing never blocks and never fails; a subscriber that falls more
/// than the channel capacity behind sees `RecvError::Lagged` and resumes
/// from the oldest retained event.
///
/// ```rust
/// use parkspot_events::bus::{EventBus, ParkingEvent, LOCATION_CREATED};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// assert_eq!(bus.publish(ParkingEvent::new(LOCATION_CREATED)), 1);
/// assert_eq!(rx.try_recv().unwrap().event_type, LOCATION_CREATED);
/// ```
pub struct EventBus {
    sender: broadcast::Sender<ParkingEvent>,
}

impl EventBus {
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Hand `event` to every current subscriber and return how many there
    /// were. With no subscribers the event is dropped.
    pub fn publish(&self, event: ParkingEvent) -> usize {
        let event_type = event.event_type.clone();
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::trace!(%event_type, delivered, "Event published");
        delivered
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ParkingEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use parkspot_core::types::new_id;

    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let location_id = new_id();

        let event = ParkingEvent::new(RESERVATION_CONFIRMED)
            .for_location(location_id)
            .for_session("session-1")
            .with_payload(serde_json::json!({"occupied_spots": 12}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, RESERVATION_CONFIRMED);
        assert_eq!(received.location_id, Some(location_id));
        assert_eq!(received.session_id.as_deref(), Some("session-1"));
        assert_eq!(received.payload["occupied_spots"], 12);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(ParkingEvent::new(LOCATION_CREATED));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.event_type, LOCATION_CREATED);
        assert_eq!(e2.event_type, LOCATION_CREATED);
    }

    #[test]
    fn publish_without_subscribers_is_dropped() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(ParkingEvent::new("orphan.event")), 0);
    }

    #[tokio::test]
    async fn slow_subscriber_lags() {
        let bus = EventBus::with_capacity(2);
        let mut rx = bus.subscribe();

        for _ in 0..3 {
            bus.publish(ParkingEvent::new(LOCATION_OCCUPANCY_CHANGED));
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert!(rx.recv().await.is_ok());
    }

    #[test]
    fn default_event_has_empty_optional_fields() {
        let event = ParkingEvent::new("bare.event");
        assert!(event.location_id.is_none());
        assert!(event.session_id.is_none());
        assert!(event.payload.is_object());
    }
}
