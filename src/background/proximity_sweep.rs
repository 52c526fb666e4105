//! Periodic proximity sweep: every tick, run the proximity check for each
//! user who enabled location tracking and has a known position.
//!
//! Polling keeps the scan strategy behind one seam; swapping in a spatial
//! index or event-driven geofencing only touches this job and
//! `notifications::proximity`.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tracing::{debug, error, info};

use crate::config::ProximityConfig;
use crate::notifications::dispatch::Dispatcher;
use crate::notifications::proximity;
use crate::notifications::repo::UserSettings;

pub async fn run(db: PgPool, dispatcher: Arc<Dispatcher>, config: ProximityConfig) {
    info!(
        sweep_secs = config.sweep_secs,
        default_radius_m = config.default_radius_m,
        "proximity sweep started"
    );

    let mut interval = tokio::time::interval(Duration::from_secs(config.sweep_secs));
    loop {
        interval.tick().await;

        let user_ids = match UserSettings::tracked_user_ids(&db).await {
            Ok(ids) => ids,
            Err(e) => {
                error!(error = %e, "proximity sweep: user query failed");
                continue;
            }
        };
        debug!(users = user_ids.len(), "proximity sweep tick");

        for user_id in user_ids {
            if let Err(e) =
                proximity::check_and_notify(&db, &dispatcher, user_id, config.default_radius_m)
                    .await
            {
                error!(user_id = %user_id, error = %e, "proximity check failed");
            }
        }
    }
}
