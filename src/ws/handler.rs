use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{FromRef, Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::state::AppState;

use super::hub::{WsEvent, WsHub};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

/// Inbound application frames; only ping is understood.
#[derive(Debug, Deserialize)]
struct ClientFrame {
    r#type: String,
}

/// `GET /ws?token=<access token>`: authenticates before completing the
/// upgrade. A missing or invalid token is rejected with 401 and no
/// connection is ever registered; there are no anonymous connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let token = query
        .token
        .ok_or_else(|| ApiError::Unauthorized("Missing token".into()))?;

    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_access(&token).map_err(|_| {
        warn!("websocket upgrade with invalid token");
        ApiError::Unauthorized("Invalid or expired token".into())
    })?;

    let hub = state.hub.clone();
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, hub, claims.sub)))
}

/// Manage one authenticated connection after the upgrade.
///
/// Registers with the hub, forwards hub messages to the sink from a spawned
/// task, and processes inbound frames on the current task until the peer
/// disconnects.
async fn handle_socket(socket: WebSocket, hub: Arc<WsHub>, user_id: Uuid) {
    let (conn_id, mut rx) = hub.register(user_id).await;
    info!(user_id = %user_id, conn_id = %conn_id, "websocket connected");

    let (mut sink, mut stream) = socket.split();

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientFrame>(&text) {
                Ok(frame) if frame.r#type == "ping" => {
                    hub.touch(user_id, conn_id).await;
                    hub.send_to_conn(user_id, conn_id, &WsEvent::pong()).await;
                }
                Ok(frame) => {
                    debug!(user_id = %user_id, frame_type = %frame.r#type, "ignoring frame");
                }
                Err(e) => {
                    debug!(user_id = %user_id, error = %e, "unparseable frame");
                }
            },
            // Protocol pings are answered by axum; both directions count
            // as liveness.
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                hub.touch(user_id, conn_id).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(_)) => {}
            Err(e) => {
                debug!(user_id = %user_id, conn_id = %conn_id, error = %e, "websocket receive error");
                break;
            }
        }
    }

    hub.unregister(user_id, conn_id).await;
    send_task.abort();
    info!(user_id = %user_id, conn_id = %conn_id, "websocket disconnected");
}
