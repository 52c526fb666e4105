//! Heartbeat loop for the WebSocket hub: ping everyone on a fixed interval
//! and reclaim connections that stopped answering.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::WsConfig;

use super::hub::WsHub;

pub async fn run(hub: Arc<WsHub>, config: WsConfig) {
    let interval = Duration::from_secs(config.heartbeat_secs);
    let timeout = Duration::from_secs(config.timeout_secs);
    info!(
        interval_secs = config.heartbeat_secs,
        timeout_secs = config.timeout_secs,
        "websocket heartbeat started"
    );

    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;

        let closed = hub.close_stale(timeout).await;
        if closed > 0 {
            info!(closed, "stale websocket connections closed");
        }
        hub.ping_all().await;
    }
}
