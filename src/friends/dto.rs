use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct FriendRequestPayload {
    pub user_id: Uuid,
}
