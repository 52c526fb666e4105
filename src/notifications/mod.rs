pub mod dispatch;
pub mod dto;
pub mod handlers;
pub mod proximity;
pub mod push;
pub mod repo;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(handlers::list_notifications))
        .route("/notifications/unread-count", get(handlers::unread_count))
        .route("/notifications/:id/read", post(handlers::mark_read))
        .route("/notifications/read-all", post(handlers::mark_all_read))
        .route(
            "/me/settings",
            get(handlers::get_settings).put(handlers::update_settings),
        )
        .route("/me/location", put(handlers::update_location))
        .route("/push/vapid-public-key", get(handlers::vapid_public_key))
        .route(
            "/push/subscriptions",
            post(handlers::subscribe).delete(handlers::unsubscribe),
        )
}
