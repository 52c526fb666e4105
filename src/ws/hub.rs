use std::collections::HashMap;
use std::time::Duration;

use axum::extract::ws::Message;
use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::notifications::repo::Notification;

/// JSON envelope for every frame the hub sends.
#[derive(Debug, Serialize)]
pub struct WsEvent {
    pub r#type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl WsEvent {
    pub fn pong() -> Self {
        Self {
            r#type: "pong",
            data: None,
        }
    }

    pub fn notification(notification: &Notification) -> Self {
        Self {
            r#type: "notification",
            data: serde_json::to_value(notification).ok(),
        }
    }

    fn to_message(&self) -> Message {
        Message::Text(serde_json::to_string(self).unwrap_or_else(|_| "{}".into()))
    }
}

pub type ConnId = Uuid;

struct WsConnection {
    sender: mpsc::UnboundedSender<Message>,
    last_seen: OffsetDateTime,
}

/// Registry of live, authenticated WebSocket connections, keyed by user id.
/// One user may hold many simultaneous connections (tabs, devices).
///
/// Owned by `AppState` and injected where needed. All state is
/// process-local and lost on restart. Thread-safe via the interior
/// `RwLock`.
pub struct WsHub {
    connections: RwLock<HashMap<Uuid, HashMap<ConnId, WsConnection>>>,
}

impl WsHub {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection for an authenticated user.
    ///
    /// Returns the connection id and the receiver half of the outbound
    /// channel; the caller forwards received messages to the socket sink.
    pub async fn register(&self, user_id: Uuid) -> (ConnId, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn_id = Uuid::new_v4();
        let conn = WsConnection {
            sender: tx,
            last_seen: OffsetDateTime::now_utc(),
        };
        self.connections
            .write()
            .await
            .entry(user_id)
            .or_default()
            .insert(conn_id, conn);
        (conn_id, rx)
    }

    /// Remove a connection; drops the user's entry once its last connection
    /// is gone.
    pub async fn unregister(&self, user_id: Uuid, conn_id: ConnId) {
        let mut conns = self.connections.write().await;
        if let Some(user_conns) = conns.get_mut(&user_id) {
            user_conns.remove(&conn_id);
            if user_conns.is_empty() {
                conns.remove(&user_id);
            }
        }
    }

    /// Refresh the liveness stamp after a pong or an application ping.
    pub async fn touch(&self, user_id: Uuid, conn_id: ConnId) {
        let mut conns = self.connections.write().await;
        if let Some(conn) = conns.get_mut(&user_id).and_then(|m| m.get_mut(&conn_id)) {
            conn.last_seen = OffsetDateTime::now_utc();
        }
    }

    /// Send an event to every open connection of one user.
    ///
    /// Returns the number of sockets the event was handed to. Connections
    /// whose channels are closed are skipped silently; their tasks clean
    /// them up on their next loop iteration.
    pub async fn send_to_user(&self, user_id: Uuid, event: &WsEvent) -> usize {
        let message = event.to_message();
        let conns = self.connections.read().await;
        let Some(user_conns) = conns.get(&user_id) else {
            return 0;
        };
        user_conns
            .values()
            .filter(|conn| conn.sender.send(message.clone()).is_ok())
            .count()
    }

    /// Reply on a single connection (application-level pong).
    pub async fn send_to_conn(&self, user_id: Uuid, conn_id: ConnId, event: &WsEvent) -> bool {
        let conns = self.connections.read().await;
        conns
            .get(&user_id)
            .and_then(|m| m.get(&conn_id))
            .map(|conn| conn.sender.send(event.to_message()).is_ok())
            .unwrap_or(false)
    }

    /// Fan-out over the single-user primitive.
    pub async fn broadcast_to_users(&self, user_ids: &[Uuid], event: &WsEvent) -> usize {
        let mut sent = 0;
        for &user_id in user_ids {
            sent += self.send_to_user(user_id, event).await;
        }
        sent
    }

    pub async fn connection_count(&self) -> usize {
        self.connections
            .read()
            .await
            .values()
            .map(HashMap::len)
            .sum()
    }

    pub async fn user_connection_count(&self, user_id: Uuid) -> usize {
        self.connections
            .read()
            .await
            .get(&user_id)
            .map_or(0, HashMap::len)
    }

    /// Send a protocol Ping to every connection; answered pongs refresh
    /// the liveness stamps.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for user_conns in conns.values() {
            for conn in user_conns.values() {
                let _ = conn.sender.send(Message::Ping(Vec::new()));
            }
        }
    }

    /// Force-close every connection whose last-seen stamp is older than
    /// `timeout`, reclaiming its registry slot. Returns how many were
    /// closed.
    pub async fn close_stale(&self, timeout: Duration) -> usize {
        let cutoff = OffsetDateTime::now_utc() - timeout;
        let mut closed = 0;

        let mut conns = self.connections.write().await;
        for user_conns in conns.values_mut() {
            user_conns.retain(|_, conn| {
                if conn.last_seen < cutoff {
                    let _ = conn.sender.send(Message::Close(None));
                    closed += 1;
                    false
                } else {
                    true
                }
            });
        }
        conns.retain(|_, user_conns| !user_conns.is_empty());

        closed
    }
}

impl Default for WsHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_as_typed_envelopes() {
        let json = serde_json::to_string(&WsEvent::pong()).unwrap();
        assert_eq!(json, r#"{"type":"pong"}"#);

        let event = WsEvent {
            r#type: "notification",
            data: Some(serde_json::json!({"title": "hello"})),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"notification""#));
        assert!(json.contains(r#""title":"hello""#));
    }
}
