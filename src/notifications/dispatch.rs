//! Notification dispatch: settings gating, durable in-app recording, live
//! WebSocket forwarding, and Web Push fan-out with stale-subscription
//! pruning.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ws::hub::{WsEvent, WsHub};

use super::push::{PushOutcome, PushSender};
use super::repo::{Notification, PushSubscription, UserSettings};

/// One variant per notification category the app sends.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationKind {
    FriendRequest {
        from_user_id: Uuid,
        from_name: String,
    },
    FriendAccepted {
        by_user_id: Uuid,
        by_name: String,
    },
    NearbyTrip {
        trip_id: Uuid,
        trip_title: String,
        distance_m: f64,
    },
}

impl NotificationKind {
    pub fn category(&self) -> &'static str {
        match self {
            NotificationKind::FriendRequest { .. } => "friend_request",
            NotificationKind::FriendAccepted { .. } => "friend_accepted",
            NotificationKind::NearbyTrip { .. } => "nearby_trip",
        }
    }

    pub fn title(&self) -> String {
        match self {
            NotificationKind::FriendRequest { .. } => "New friend request".to_string(),
            NotificationKind::FriendAccepted { .. } => "Friend request accepted".to_string(),
            NotificationKind::NearbyTrip { .. } => "Excursion nearby".to_string(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            NotificationKind::FriendRequest { from_name, .. } => {
                format!("{from_name} sent you a friend request")
            }
            NotificationKind::FriendAccepted { by_name, .. } => {
                format!("{by_name} accepted your friend request")
            }
            NotificationKind::NearbyTrip {
                trip_title,
                distance_m,
                ..
            } => {
                format!("\"{trip_title}\" is {} away", format_distance(*distance_m))
            }
        }
    }

    /// The entity this notification points at, stored for deep links and
    /// the proximity de-duplication window.
    pub fn related_id(&self) -> Option<Uuid> {
        match self {
            NotificationKind::FriendRequest { from_user_id, .. } => Some(*from_user_id),
            NotificationKind::FriendAccepted { by_user_id, .. } => Some(*by_user_id),
            NotificationKind::NearbyTrip { trip_id, .. } => Some(*trip_id),
        }
    }
}

pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{} m", meters.round() as i64)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// A category is sent only when the global flag and its own flag are both on.
pub fn category_allowed(settings: &UserSettings, kind: &NotificationKind) -> bool {
    if !settings.notifications_enabled {
        return false;
    }
    match kind {
        NotificationKind::FriendRequest { .. } => settings.friend_requests_enabled,
        NotificationKind::FriendAccepted { .. } => settings.friend_activity_enabled,
        NotificationKind::NearbyTrip { .. } => settings.nearby_trips_enabled,
    }
}

pub struct Dispatcher {
    db: PgPool,
    hub: Arc<WsHub>,
    push: Option<Arc<dyn PushSender>>,
}

impl Dispatcher {
    pub fn new(db: PgPool, hub: Arc<WsHub>, push: Option<Arc<dyn PushSender>>) -> Self {
        Self { db, hub, push }
    }

    /// Dispatch a notification to one user.
    ///
    /// Returns `Ok(true)` iff at least one Web Push delivery succeeded.
    /// When the user has no settings row or the category is disabled,
    /// returns `Ok(false)` without side effects. Otherwise one notification
    /// row is always recorded, whatever happens to push delivery, so the
    /// in-app center stays consistent.
    pub async fn send(&self, user_id: Uuid, kind: NotificationKind) -> anyhow::Result<bool> {
        let Some(settings) = UserSettings::find(&self.db, user_id).await? else {
            debug!(user_id = %user_id, "no settings row; notification suppressed");
            return Ok(false);
        };
        if !category_allowed(&settings, &kind) {
            debug!(user_id = %user_id, category = kind.category(), "category disabled");
            return Ok(false);
        }

        let row = Notification::insert(
            &self.db,
            user_id,
            kind.category(),
            &kind.title(),
            &kind.message(),
            kind.related_id(),
        )
        .await?;

        let live = self.hub.send_to_user(user_id, &WsEvent::notification(&row)).await;
        debug!(user_id = %user_id, sockets = live, "notification forwarded to live connections");

        let Some(push) = &self.push else {
            return Ok(false);
        };

        let payload = serde_json::to_vec(&json!({
            "title": row.title,
            "message": row.message,
            "kind": row.kind,
            "related_id": row.related_id,
        }))?;

        let subscriptions = PushSubscription::list_for_user(&self.db, user_id).await?;
        let mut delivered = false;
        for subscription in subscriptions {
            match push.deliver(&subscription, &payload).await {
                PushOutcome::Delivered => delivered = true,
                PushOutcome::EndpointGone => {
                    PushSubscription::delete(&self.db, subscription.id).await?;
                    info!(
                        user_id = %user_id,
                        endpoint = %subscription.endpoint,
                        "stale push subscription removed"
                    );
                }
                PushOutcome::Failed(reason) => {
                    warn!(
                        user_id = %user_id,
                        endpoint = %subscription.endpoint,
                        %reason,
                        "push delivery skipped"
                    );
                }
            }
        }

        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> UserSettings {
        UserSettings::default_for(Uuid::new_v4())
    }

    fn nearby() -> NotificationKind {
        NotificationKind::NearbyTrip {
            trip_id: Uuid::new_v4(),
            trip_title: "Uetliberg".into(),
            distance_m: 150.0,
        }
    }

    #[test]
    fn global_flag_suppresses_every_category() {
        let mut s = settings();
        s.notifications_enabled = false;
        assert!(!category_allowed(
            &s,
            &NotificationKind::FriendRequest {
                from_user_id: Uuid::new_v4(),
                from_name: "Anna".into()
            }
        ));
        assert!(!category_allowed(
            &s,
            &NotificationKind::FriendAccepted {
                by_user_id: Uuid::new_v4(),
                by_name: "Ben".into()
            }
        ));
        assert!(!category_allowed(&s, &nearby()));
    }

    #[test]
    fn category_flag_suppresses_only_its_kind() {
        let mut s = settings();
        s.nearby_trips_enabled = false;
        assert!(!category_allowed(&s, &nearby()));
        assert!(category_allowed(
            &s,
            &NotificationKind::FriendRequest {
                from_user_id: Uuid::new_v4(),
                from_name: "Anna".into()
            }
        ));
    }

    #[test]
    fn defaults_allow_all_categories() {
        let s = settings();
        assert!(category_allowed(&s, &nearby()));
    }

    #[test]
    fn kinds_map_to_category_strings() {
        assert_eq!(
            NotificationKind::FriendRequest {
                from_user_id: Uuid::new_v4(),
                from_name: "Anna".into()
            }
            .category(),
            "friend_request"
        );
        assert_eq!(
            NotificationKind::FriendAccepted {
                by_user_id: Uuid::new_v4(),
                by_name: "Ben".into()
            }
            .category(),
            "friend_accepted"
        );
        assert_eq!(nearby().category(), "nearby_trip");
    }

    #[test]
    fn related_id_points_at_the_trip() {
        let trip_id = Uuid::new_v4();
        let kind = NotificationKind::NearbyTrip {
            trip_id,
            trip_title: "Rheinfall".into(),
            distance_m: 4200.0,
        };
        assert_eq!(kind.related_id(), Some(trip_id));
    }

    #[test]
    fn messages_carry_the_actor_name() {
        let kind = NotificationKind::FriendRequest {
            from_user_id: Uuid::new_v4(),
            from_name: "Anna".into(),
        };
        assert_eq!(kind.message(), "Anna sent you a friend request");
    }

    #[test]
    fn distances_format_in_meters_then_kilometers() {
        assert_eq!(format_distance(150.0), "150 m");
        assert_eq!(format_distance(999.4), "999 m");
        assert_eq!(format_distance(4200.0), "4.2 km");
    }
}
