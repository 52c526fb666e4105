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
use crate::trips::dto::validate_coordinates;

use super::dto::{
    LocationPayload, Pagination, SettingsPayload, SubscribePayload, UnreadCount,
    UnsubscribePayload, VapidPublicKey,
};
use super::repo::{Notification, PushSubscription, UserLocation, UserSettings};

#[instrument(skip(state))]
pub async fn list_notifications(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> ApiResult<Json<Vec<Notification>>> {
    let rows = Notification::list_for_user(&state.db, user_id, p.limit, p.offset).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn unread_count(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<UnreadCount>> {
    let count = Notification::unread_count(&state.db, user_id).await?;
    Ok(Json(UnreadCount { count }))
}

#[instrument(skip(state))]
pub async fn mark_read(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !Notification::mark_read(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("Notification"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn mark_all_read(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<StatusCode> {
    let updated = Notification::mark_all_read(&state.db, user_id).await?;
    info!(user_id = %user_id, updated, "notifications marked read");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn get_settings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<UserSettings>> {
    let settings = UserSettings::find(&state.db, user_id)
        .await?
        .unwrap_or_else(|| UserSettings::default_for(user_id));
    Ok(Json(settings))
}

#[instrument(skip(state, payload))]
pub async fn update_settings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SettingsPayload>,
) -> ApiResult<Json<UserSettings>> {
    if payload.nearby_radius_m <= 0 {
        return Err(ApiError::Validation(
            "nearby_radius_m must be positive".into(),
        ));
    }
    let settings = UserSettings::upsert(
        &state.db,
        &UserSettings {
            user_id,
            notifications_enabled: payload.notifications_enabled,
            friend_requests_enabled: payload.friend_requests_enabled,
            friend_activity_enabled: payload.friend_activity_enabled,
            nearby_trips_enabled: payload.nearby_trips_enabled,
            nearby_radius_m: payload.nearby_radius_m,
            location_tracking_enabled: payload.location_tracking_enabled,
        },
    )
    .await?;
    Ok(Json(settings))
}

#[instrument(skip(state, payload))]
pub async fn update_location(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<LocationPayload>,
) -> ApiResult<Json<UserLocation>> {
    validate_coordinates(Some(payload.latitude), Some(payload.longitude))
        .map_err(ApiError::Validation)?;
    let location = UserLocation::upsert(
        &state.db,
        user_id,
        payload.latitude,
        payload.longitude,
        payload.accuracy,
    )
    .await?;
    Ok(Json(location))
}

#[instrument(skip(state))]
pub async fn vapid_public_key(State(state): State<AppState>) -> ApiResult<Json<VapidPublicKey>> {
    let public_key = state
        .config
        .push
        .vapid_public_key
        .clone()
        .ok_or(ApiError::NotFound("VAPID public key"))?;
    Ok(Json(VapidPublicKey { public_key }))
}

#[instrument(skip(state, payload))]
pub async fn subscribe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SubscribePayload>,
) -> ApiResult<(StatusCode, Json<PushSubscription>)> {
    if payload.endpoint.trim().is_empty() {
        return Err(ApiError::Validation("endpoint is required".into()));
    }

    // Settings row is created lazily on first subscribe
    UserSettings::ensure_exists(&state.db, user_id).await?;

    let subscription = PushSubscription::upsert(
        &state.db,
        user_id,
        &payload.endpoint,
        &payload.keys.p256dh,
        &payload.keys.auth,
    )
    .await?;
    info!(user_id = %user_id, endpoint = %subscription.endpoint, "push subscription stored");
    Ok((StatusCode::CREATED, Json(subscription)))
}

#[instrument(skip(state, payload))]
pub async fn unsubscribe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UnsubscribePayload>,
) -> ApiResult<StatusCode> {
    let removed =
        PushSubscription::delete_by_endpoint(&state.db, user_id, &payload.endpoint).await?;
    if removed {
        info!(user_id = %user_id, endpoint = %payload.endpoint, "push subscription removed");
    }
    Ok(StatusCode::NO_CONTENT)
}
