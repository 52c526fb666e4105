use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Friendships are stored as mirrored row pairs: a request from A to B
/// inserts (A, B) and (B, A), both `pending` with `requested_by = A`.
/// Accepting flips both rows to `accepted`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Friendship {
    pub user_id: Uuid,
    pub friend_id: Uuid,
    pub status: String,
    pub requested_by: Uuid,
    pub created_at: OffsetDateTime,
}

/// Profile projection used by friend and request listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FriendProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
}

impl Friendship {
    pub async fn find(
        db: &PgPool,
        user_id: Uuid,
        friend_id: Uuid,
    ) -> anyhow::Result<Option<Friendship>> {
        let row = sqlx::query_as::<_, Friendship>(
            r#"
            SELECT user_id, friend_id, status, requested_by, created_at
            FROM friendships
            WHERE user_id = $1 AND friend_id = $2
            "#,
        )
        .bind(user_id)
        .bind(friend_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Insert the mirrored pair in a single statement so it is atomic.
    pub async fn create_pair(db: &PgPool, from: Uuid, to: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO friendships (user_id, friend_id, status, requested_by)
            VALUES ($1, $2, 'pending', $1), ($2, $1, 'pending', $1)
            "#,
        )
        .bind(from)
        .bind(to)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Flip both rows of a pending pair to `accepted`. Only the recipient
    /// of the request may accept, so the pair must carry
    /// `requested_by = requester`. Returns false when no such pair exists.
    pub async fn accept_pair(
        db: &PgPool,
        recipient: Uuid,
        requester: Uuid,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE friendships
            SET status = 'accepted'
            WHERE ((user_id = $1 AND friend_id = $2) OR (user_id = $2 AND friend_id = $1))
              AND status = 'pending'
              AND requested_by = $2
            "#,
        )
        .bind(recipient)
        .bind(requester)
        .execute(db)
        .await?;
        Ok(result.rows_affected() == 2)
    }

    /// Remove both rows; covers decline and unfriend.
    pub async fn delete_pair(db: &PgPool, a: Uuid, b: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM friendships
            WHERE (user_id = $1 AND friend_id = $2) OR (user_id = $2 AND friend_id = $1)
            "#,
        )
        .bind(a)
        .bind(b)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_friends(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<FriendProfile>> {
        let rows = sqlx::query_as::<_, FriendProfile>(
            r#"
            SELECT u.id, u.email, u.display_name
            FROM friendships f
            JOIN users u ON u.id = f.friend_id
            WHERE f.user_id = $1 AND f.status = 'accepted'
            ORDER BY u.display_name
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Requests sent to this user that are still pending.
    pub async fn list_incoming_pending(
        db: &PgPool,
        user_id: Uuid,
    ) -> anyhow::Result<Vec<FriendProfile>> {
        let rows = sqlx::query_as::<_, FriendProfile>(
            r#"
            SELECT u.id, u.email, u.display_name
            FROM friendships f
            JOIN users u ON u.id = f.friend_id
            WHERE f.user_id = $1 AND f.status = 'pending' AND f.requested_by = f.friend_id
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
