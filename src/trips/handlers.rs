use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::jwt::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

use super::dto::{validate_coordinates, Pagination, TripPayload, VisibilityPayload};
use super::repo::Trip;

fn validate_payload(payload: &TripPayload) -> Result<(), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".into()));
    }
    validate_coordinates(payload.latitude, payload.longitude).map_err(ApiError::Validation)
}

/// Load a trip and check the caller owns it.
async fn owned_trip(state: &AppState, user_id: Uuid, id: Uuid) -> ApiResult<Trip> {
    let trip = Trip::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Trip"))?;
    if trip.owner_id != user_id {
        return Err(ApiError::Forbidden("Not the trip owner".into()));
    }
    Ok(trip)
}

#[instrument(skip(state))]
pub async fn list_trips(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> ApiResult<Json<Vec<Trip>>> {
    let trips = Trip::list_by_owner(&state.db, user_id, p.limit, p.offset).await?;
    Ok(Json(trips))
}

#[instrument(skip(state))]
pub async fn list_public_trips(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> ApiResult<Json<Vec<Trip>>> {
    let trips = Trip::list_public(&state.db, p.limit, p.offset).await?;
    Ok(Json(trips))
}

#[instrument(skip(state, payload))]
pub async fn create_trip(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<TripPayload>,
) -> ApiResult<(StatusCode, Json<Trip>)> {
    validate_payload(&payload)?;

    let trip = Trip::create(
        &state.db,
        user_id,
        payload.title.trim(),
        payload.description.as_deref(),
        payload.latitude,
        payload.longitude,
        payload.is_public,
    )
    .await?;

    info!(trip_id = %trip.id, owner_id = %user_id, "trip created");
    Ok((StatusCode::CREATED, Json(trip)))
}

#[instrument(skip(state))]
pub async fn get_trip(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Trip>> {
    let trip = Trip::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Trip"))?;
    if trip.owner_id != user_id && !trip.is_public {
        // Private trips of other users are indistinguishable from missing ones
        return Err(ApiError::NotFound("Trip"));
    }
    Ok(Json(trip))
}

#[instrument(skip(state, payload))]
pub async fn update_trip(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TripPayload>,
) -> ApiResult<Json<Trip>> {
    validate_payload(&payload)?;
    owned_trip(&state, user_id, id).await?;

    let trip = Trip::update(
        &state.db,
        id,
        payload.title.trim(),
        payload.description.as_deref(),
        payload.latitude,
        payload.longitude,
        payload.is_public,
    )
    .await?;
    Ok(Json(trip))
}

#[instrument(skip(state))]
pub async fn set_visibility(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<VisibilityPayload>,
) -> ApiResult<Json<Trip>> {
    owned_trip(&state, user_id, id).await?;
    let trip = Trip::set_visibility(&state.db, id, payload.is_public).await?;
    Ok(Json(trip))
}

#[instrument(skip(state))]
pub async fn delete_trip(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    owned_trip(&state, user_id, id).await?;
    Trip::delete(&state.db, id).await?;
    info!(trip_id = %id, owner_id = %user_id, "trip deleted");
    Ok(StatusCode::NO_CONTENT)
}
