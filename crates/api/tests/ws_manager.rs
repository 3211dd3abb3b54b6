//! Unit tests for `WsManager` and the `NotificationRouter`.
//!
//! These tests exercise the connection manager directly, without performing
//! any HTTP upgrades. They verify add/remove semantics, broadcast and
//! per-session delivery, shutdown, and how bus events reach sockets.

use std::sync::Arc;

use axum::extract::ws::Message;
use parkspot_api::notifications::NotificationRouter;
use parkspot_api::ws::WsManager;
use parkspot_core::types::new_id;
use parkspot_events::bus::{LOCATION_OCCUPANCY_CHANGED, RESERVATION_EXPIRED};
use parkspot_events::{EventBus, ParkingEvent};
use serde_json::{json, Value};

fn text_json(message: Message) -> Value {
    match message {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("Expected a text frame, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: add() and remove() track the connection count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let manager = WsManager::new();
    assert_eq!(manager.connection_count().await, 0);

    let _rx1 = manager.add("conn-1".to_string(), None).await;
    let _rx2 = manager.add("conn-2".to_string(), Some("session-a".into())).await;
    assert_eq!(manager.connection_count().await, 2);

    manager.remove("conn-1").await;
    manager.remove("nonexistent").await;
    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() sends Close and clears all connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string(), None).await;
    let mut rx2 = manager.add("conn-2".to_string(), Some("session-a".into())).await;

    manager.shutdown_all().await;
    assert_eq!(manager.connection_count().await, 0);

    let msg1 = rx1.recv().await.expect("rx1 should receive Close");
    assert!(matches!(msg1, Message::Close(None)), "Expected Close(None), got: {msg1:?}");
    let msg2 = rx2.recv().await.expect("rx2 should receive Close");
    assert!(matches!(msg2, Message::Close(None)), "Expected Close(None), got: {msg2:?}");

    assert!(rx1.recv().await.is_none(), "Channel should be closed after shutdown");
}

// ---------------------------------------------------------------------------
// Test: broadcast() reaches every connection and skips closed channels
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_skips_closed_channels() {
    let manager = WsManager::new();

    let rx1 = manager.add("conn-1".to_string(), None).await;
    let mut rx2 = manager.add("conn-2".to_string(), None).await;
    let mut rx3 = manager.add("conn-3".to_string(), Some("session-a".into())).await;
    drop(rx1);

    manager.broadcast(Message::Text("still alive".into())).await;

    let msg = rx2.recv().await.expect("rx2 should receive broadcast");
    assert!(matches!(&msg, Message::Text(t) if *t == "still alive"));
    let msg = rx3.recv().await.expect("rx3 should receive broadcast");
    assert!(matches!(&msg, Message::Text(t) if *t == "still alive"));
}

// ---------------------------------------------------------------------------
// Test: send_to_session() only reaches that session's sockets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_to_session_targets_one_session() {
    let manager = WsManager::new();

    let mut tab1 = manager.add("conn-1".to_string(), Some("session-a".into())).await;
    let mut tab2 = manager.add("conn-2".to_string(), Some("session-a".into())).await;
    let mut other = manager.add("conn-3".to_string(), Some("session-b".into())).await;
    let mut anonymous = manager.add("conn-4".to_string(), None).await;

    let delivered = manager
        .send_to_session("session-a", Message::Text("yours".into()))
        .await;
    assert_eq!(delivered, 2);

    assert!(matches!(tab1.try_recv(), Ok(Message::Text(t)) if t == "yours"));
    assert!(matches!(tab2.try_recv(), Ok(Message::Text(t)) if t == "yours"));
    assert!(other.try_recv().is_err());
    assert!(anonymous.try_recv().is_err());

    let none = manager
        .send_to_session("session-z", Message::Text("nobody".into()))
        .await;
    assert_eq!(none, 0);
}

// ---------------------------------------------------------------------------
// Test: duplicate ID replaces the previous connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_id_replaces_previous_connection() {
    let manager = WsManager::new();

    let _rx_old = manager.add("conn-1".to_string(), None).await;
    let mut rx_new = manager.add("conn-1".to_string(), Some("session-a".into())).await;
    assert_eq!(manager.connection_count().await, 1);

    manager
        .send_to_session("session-a", Message::Text("replaced".into()))
        .await;
    let msg = rx_new.recv().await.expect("New rx should receive message");
    assert!(matches!(&msg, Message::Text(t) if *t == "replaced"));
}

// ---------------------------------------------------------------------------
// Test: NotificationRouter delivery rules
// ---------------------------------------------------------------------------

#[tokio::test]
async fn session_events_reach_only_their_session() {
    let manager = Arc::new(WsManager::new());
    let mut mine = manager.add("conn-1".to_string(), Some("session-a".into())).await;
    let mut theirs = manager.add("conn-2".to_string(), Some("session-b".into())).await;
    let router = NotificationRouter::new(Arc::clone(&manager));

    let event = ParkingEvent::new(RESERVATION_EXPIRED)
        .for_session("session-a")
        .with_payload(json!({ "notify": false }));
    router.route_event(&event).await.unwrap();

    let json = text_json(mine.try_recv().expect("session socket should get the event"));
    assert_eq!(json["event_type"], RESERVATION_EXPIRED);
    assert_eq!(json["payload"]["notify"], false);
    assert!(theirs.try_recv().is_err());
}

#[tokio::test]
async fn public_events_are_broadcast() {
    let manager = Arc::new(WsManager::new());
    let mut anonymous = manager.add("conn-1".to_string(), None).await;
    let mut session = manager.add("conn-2".to_string(), Some("session-a".into())).await;
    let router = NotificationRouter::new(Arc::clone(&manager));

    let lot = new_id();
    let event = ParkingEvent::new(LOCATION_OCCUPANCY_CHANGED)
        .for_location(lot)
        .with_payload(json!({ "occupied": 3 }));
    router.route_event(&event).await.unwrap();

    for rx in [&mut anonymous, &mut session] {
        let json = text_json(rx.try_recv().expect("every socket should get public events"));
        assert_eq!(json["event_type"], LOCATION_OCCUPANCY_CHANGED);
        assert_eq!(json["location_id"], lot.to_string());
    }
}

#[tokio::test]
async fn router_stops_when_the_bus_is_dropped() {
    let manager = Arc::new(WsManager::new());
    let mut rx = manager.add("conn-1".to_string(), None).await;
    let bus = EventBus::default();
    let handle = tokio::spawn(NotificationRouter::new(Arc::clone(&manager)).run(bus.subscribe()));

    bus.publish(ParkingEvent::new(LOCATION_OCCUPANCY_CHANGED));
    drop(bus);
    handle.await.expect("router task should exit cleanly");

    let json = text_json(rx.recv().await.expect("event published before close"));
    assert_eq!(json["event_type"], LOCATION_OCCUPANCY_CHANGED);
}
