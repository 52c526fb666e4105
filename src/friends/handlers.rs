use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::jwt::AuthUser;
use crate::auth::repo::User;
use crate::error::{ApiError, ApiResult};
use crate::notifications::dispatch::NotificationKind;
use crate::state::AppState;

use super::dto::FriendRequestPayload;
use super::repo::{FriendProfile, Friendship};

#[instrument(skip(state, payload))]
pub async fn send_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<FriendRequestPayload>,
) -> ApiResult<StatusCode> {
    let target_id = payload.user_id;
    if target_id == user_id {
        return Err(ApiError::Validation(
            "Cannot send a friend request to yourself".into(),
        ));
    }

    let target = User::find_by_id(&state.db, target_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    if Friendship::find(&state.db, user_id, target_id).await?.is_some() {
        return Err(ApiError::Conflict(
            "Friend request already exists".into(),
        ));
    }

    let sender = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Friendship::create_pair(&state.db, user_id, target_id).await?;
    info!(from = %user_id, to = %target.id, "friend request sent");

    if let Err(e) = state
        .dispatcher
        .send(
            target_id,
            NotificationKind::FriendRequest {
                from_user_id: user_id,
                from_name: sender.display_name,
            },
        )
        .await
    {
        warn!(user_id = %target_id, error = %e, "friend request notification failed");
    }

    Ok(StatusCode::CREATED)
}

#[instrument(skip(state))]
pub async fn accept_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(requester_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !Friendship::accept_pair(&state.db, user_id, requester_id).await? {
        return Err(ApiError::NotFound("Friend request"));
    }

    let accepter = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    info!(recipient = %user_id, requester = %requester_id, "friend request accepted");

    if let Err(e) = state
        .dispatcher
        .send(
            requester_id,
            NotificationKind::FriendAccepted {
                by_user_id: user_id,
                by_name: accepter.display_name,
            },
        )
        .await
    {
        warn!(user_id = %requester_id, error = %e, "friend accepted notification failed");
    }

    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn list_friends(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<FriendProfile>>> {
    let friends = Friendship::list_friends(&state.db, user_id).await?;
    Ok(Json(friends))
}

#[instrument(skip(state))]
pub async fn list_requests(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<FriendProfile>>> {
    let requests = Friendship::list_incoming_pending(&state.db, user_id).await?;
    Ok(Json(requests))
}

#[instrument(skip(state))]
pub async fn remove_friend(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(friend_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !Friendship::delete_pair(&state.db, user_id, friend_id).await? {
        return Err(ApiError::NotFound("Friendship"));
    }
    info!(user_id = %user_id, friend_id = %friend_id, "friendship removed");
    Ok(StatusCode::NO_CONTENT)
}
