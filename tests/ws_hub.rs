//! Tests for the WebSocket hub, exercised directly without HTTP upgrades.
//! They verify registration semantics, per-user delivery, fan-out, and the
//! heartbeat's stale-connection reclamation.

use std::time::Duration;

use axum::extract::ws::Message;
use uuid::Uuid;

use ausflugfinder::ws::hub::{WsEvent, WsHub};

fn event() -> WsEvent {
    WsEvent {
        r#type: "notification",
        data: Some(serde_json::json!({"title": "hello"})),
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_and_unregister_track_counts() {
    let hub = WsHub::new();
    let user = Uuid::new_v4();

    let (conn_a, _rx_a) = hub.register(user).await;
    let (conn_b, _rx_b) = hub.register(user).await;
    assert_eq!(hub.connection_count().await, 2);
    assert_eq!(hub.user_connection_count(user).await, 2);

    hub.unregister(user, conn_a).await;
    assert_eq!(hub.user_connection_count(user).await, 1);

    hub.unregister(user, conn_b).await;
    assert_eq!(hub.connection_count().await, 0);
    assert_eq!(hub.user_connection_count(user).await, 0);
}

#[tokio::test]
async fn unregister_unknown_connection_is_noop() {
    let hub = WsHub::new();
    let user = Uuid::new_v4();
    let (_conn, _rx) = hub.register(user).await;

    hub.unregister(user, Uuid::new_v4()).await;
    hub.unregister(Uuid::new_v4(), Uuid::new_v4()).await;
    assert_eq!(hub.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_to_user_reaches_all_their_sockets_and_nobody_else() {
    let hub = WsHub::new();
    let anna = Uuid::new_v4();
    let ben = Uuid::new_v4();

    let (_a1, mut rx_a1) = hub.register(anna).await;
    let (_a2, mut rx_a2) = hub.register(anna).await;
    let (_b1, mut rx_b1) = hub.register(ben).await;

    let sent = hub.send_to_user(anna, &event()).await;
    assert_eq!(sent, 2);

    assert!(matches!(rx_a1.recv().await, Some(Message::Text(_))));
    assert!(matches!(rx_a2.recv().await, Some(Message::Text(_))));
    assert!(rx_b1.try_recv().is_err());
}

#[tokio::test]
async fn send_to_unknown_user_reaches_nothing() {
    let hub = WsHub::new();
    assert_eq!(hub.send_to_user(Uuid::new_v4(), &event()).await, 0);
}

#[tokio::test]
async fn closed_channels_are_skipped_silently() {
    let hub = WsHub::new();
    let user = Uuid::new_v4();

    let (_dead, rx_dead) = hub.register(user).await;
    let (_live, mut rx_live) = hub.register(user).await;
    drop(rx_dead);

    let sent = hub.send_to_user(user, &event()).await;
    assert_eq!(sent, 1);
    assert!(matches!(rx_live.recv().await, Some(Message::Text(_))));
}

#[tokio::test]
async fn broadcast_fans_out_over_users() {
    let hub = WsHub::new();
    let anna = Uuid::new_v4();
    let ben = Uuid::new_v4();

    let (_a, mut rx_a) = hub.register(anna).await;
    let (_b, mut rx_b) = hub.register(ben).await;

    let sent = hub.broadcast_to_users(&[anna, ben], &event()).await;
    assert_eq!(sent, 2);
    assert!(matches!(rx_a.recv().await, Some(Message::Text(_))));
    assert!(matches!(rx_b.recv().await, Some(Message::Text(_))));
}

#[tokio::test]
async fn send_to_conn_targets_a_single_connection() {
    let hub = WsHub::new();
    let user = Uuid::new_v4();
    let (conn_a, mut rx_a) = hub.register(user).await;
    let (_conn_b, mut rx_b) = hub.register(user).await;

    assert!(hub.send_to_conn(user, conn_a, &WsEvent::pong()).await);
    assert!(matches!(rx_a.recv().await, Some(Message::Text(_))));
    assert!(rx_b.try_recv().is_err());

    assert!(!hub.send_to_conn(user, Uuid::new_v4(), &WsEvent::pong()).await);
}

// ---------------------------------------------------------------------------
// Heartbeat
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ping_all_sends_protocol_pings() {
    let hub = WsHub::new();
    let user = Uuid::new_v4();
    let (_conn, mut rx) = hub.register(user).await;

    hub.ping_all().await;
    assert!(matches!(rx.recv().await, Some(Message::Ping(_))));
}

#[tokio::test]
async fn stale_connections_are_closed_and_removed() {
    let hub = WsHub::new();
    let user = Uuid::new_v4();
    let (_conn, mut rx) = hub.register(user).await;

    tokio::time::sleep(Duration::from_millis(20)).await;
    let closed = hub.close_stale(Duration::from_millis(1)).await;

    assert_eq!(closed, 1);
    assert_eq!(hub.user_connection_count(user).await, 0);
    assert!(matches!(rx.recv().await, Some(Message::Close(None))));
}

#[tokio::test]
async fn fresh_connections_survive_the_sweep() {
    let hub = WsHub::new();
    let user = Uuid::new_v4();
    let (_conn, _rx) = hub.register(user).await;

    let closed = hub.close_stale(Duration::from_secs(60)).await;
    assert_eq!(closed, 0);
    assert_eq!(hub.user_connection_count(user).await, 1);
}

#[tokio::test]
async fn touch_refreshes_liveness() {
    let hub = WsHub::new();
    let user = Uuid::new_v4();
    let (conn, _rx) = hub.register(user).await;

    tokio::time::sleep(Duration::from_millis(20)).await;
    hub.touch(user, conn).await;

    // Stamp was just refreshed, so a 15 ms timeout keeps the connection
    let closed = hub.close_stale(Duration::from_millis(15)).await;
    assert_eq!(closed, 0);
    assert_eq!(hub.user_connection_count(user).await, 1);
}
