pub mod dto;
pub mod handlers;
pub mod repo;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/friends", get(handlers::list_friends))
        .route("/friends/requests", get(handlers::list_requests).post(handlers::send_request))
        .route(
            "/friends/requests/:user_id/accept",
            post(handlers::accept_request),
        )
        .route("/friends/:user_id", delete(handlers::remove_friend))
}
