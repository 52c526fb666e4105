use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::notifications::dispatch::Dispatcher;
use crate::notifications::push::{PushSender, WebPushSender};
use crate::ws::hub::WsHub;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub hub: Arc<WsHub>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let hub = Arc::new(WsHub::new());
        let push = WebPushSender::from_config(&config.push)
            .map(|sender| Arc::new(sender) as Arc<dyn PushSender>);
        if push.is_none() {
            tracing::warn!("VAPID keys not configured; web push delivery disabled");
        }
        let dispatcher = Arc::new(Dispatcher::new(db.clone(), hub.clone(), push));

        Ok(Self {
            db,
            config,
            hub,
            dispatcher,
        })
    }

    pub fn from_parts(
        db: PgPool,
        config: Arc<AppConfig>,
        hub: Arc<WsHub>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            db,
            config,
            hub,
            dispatcher,
        }
    }
}
