pub mod dto;
pub mod handlers;
pub mod repo;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips", get(handlers::list_trips).post(handlers::create_trip))
        .route("/trips/public", get(handlers::list_public_trips))
        .route(
            "/trips/:id",
            get(handlers::get_trip)
                .put(handlers::update_trip)
                .delete(handlers::delete_trip),
        )
        .route("/trips/:id/visibility", post(handlers::set_visibility))
}
