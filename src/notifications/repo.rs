use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Duration as TimeDuration, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub related_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: OffsetDateTime,
}

impl Notification {
    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        kind: &str,
        title: &str,
        message: &str,
        related_id: Option<Uuid>,
    ) -> anyhow::Result<Notification> {
        let row = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, kind, title, message, related_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, kind, title, message, related_id, is_read, created_at
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .bind(title)
        .bind(message)
        .bind(related_id)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn list_for_user(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, kind, title, message, related_id, is_read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn unread_count(db: &PgPool, user_id: Uuid) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(count)
    }

    /// Returns false when the notification does not exist or belongs to
    /// someone else.
    pub async fn mark_read(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn mark_all_read(db: &PgPool, user_id: Uuid) -> anyhow::Result<u64> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read")
                .bind(user_id)
                .execute(db)
                .await?;
        Ok(result.rows_affected())
    }

    /// De-duplication window check for proximity alerts: has a notification
    /// of `kind` referencing `related_id` been recorded for this user within
    /// the past `window_hours`?
    pub async fn recent_exists(
        db: &PgPool,
        user_id: Uuid,
        kind: &str,
        related_id: Uuid,
        window_hours: i64,
    ) -> anyhow::Result<bool> {
        let cutoff = OffsetDateTime::now_utc() - TimeDuration::hours(window_hours);
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM notifications
                WHERE user_id = $1 AND kind = $2 AND related_id = $3 AND created_at > $4
            )
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .bind(related_id)
        .bind(cutoff)
        .fetch_one(db)
        .await?;
        Ok(exists)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSettings {
    pub user_id: Uuid,
    pub notifications_enabled: bool,
    pub friend_requests_enabled: bool,
    pub friend_activity_enabled: bool,
    pub nearby_trips_enabled: bool,
    pub nearby_radius_m: i32,
    pub location_tracking_enabled: bool,
}

impl UserSettings {
    pub fn default_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            notifications_enabled: true,
            friend_requests_enabled: true,
            friend_activity_enabled: true,
            nearby_trips_enabled: true,
            nearby_radius_m: 5000,
            location_tracking_enabled: false,
        }
    }

    pub async fn find(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<UserSettings>> {
        let row = sqlx::query_as::<_, UserSettings>(
            r#"
            SELECT user_id, notifications_enabled, friend_requests_enabled,
                   friend_activity_enabled, nearby_trips_enabled, nearby_radius_m,
                   location_tracking_enabled
            FROM user_settings
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Lazily create the settings row with defaults; keeps an existing row
    /// untouched.
    pub async fn ensure_exists(db: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO user_settings (user_id) VALUES ($1) ON CONFLICT DO NOTHING")
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn upsert(db: &PgPool, settings: &UserSettings) -> anyhow::Result<UserSettings> {
        let row = sqlx::query_as::<_, UserSettings>(
            r#"
            INSERT INTO user_settings (user_id, notifications_enabled, friend_requests_enabled,
                                       friend_activity_enabled, nearby_trips_enabled,
                                       nearby_radius_m, location_tracking_enabled)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO UPDATE SET
                notifications_enabled = EXCLUDED.notifications_enabled,
                friend_requests_enabled = EXCLUDED.friend_requests_enabled,
                friend_activity_enabled = EXCLUDED.friend_activity_enabled,
                nearby_trips_enabled = EXCLUDED.nearby_trips_enabled,
                nearby_radius_m = EXCLUDED.nearby_radius_m,
                location_tracking_enabled = EXCLUDED.location_tracking_enabled
            RETURNING user_id, notifications_enabled, friend_requests_enabled,
                      friend_activity_enabled, nearby_trips_enabled, nearby_radius_m,
                      location_tracking_enabled
            "#,
        )
        .bind(settings.user_id)
        .bind(settings.notifications_enabled)
        .bind(settings.friend_requests_enabled)
        .bind(settings.friend_activity_enabled)
        .bind(settings.nearby_trips_enabled)
        .bind(settings.nearby_radius_m)
        .bind(settings.location_tracking_enabled)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    /// Users eligible for the proximity sweep: tracking enabled and a known
    /// position.
    pub async fn tracked_user_ids(db: &PgPool) -> anyhow::Result<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT s.user_id
            FROM user_settings s
            JOIN user_locations l ON l.user_id = s.user_id
            WHERE s.location_tracking_enabled
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(ids)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserLocation {
    pub user_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub updated_at: OffsetDateTime,
}

impl UserLocation {
    pub async fn find(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<UserLocation>> {
        let row = sqlx::query_as::<_, UserLocation>(
            r#"
            SELECT user_id, latitude, longitude, accuracy, updated_at
            FROM user_locations
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Latest position only; every update overwrites the previous one.
    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        latitude: f64,
        longitude: f64,
        accuracy: Option<f64>,
    ) -> anyhow::Result<UserLocation> {
        let row = sqlx::query_as::<_, UserLocation>(
            r#"
            INSERT INTO user_locations (user_id, latitude, longitude, accuracy, updated_at)
            VALUES ($1, $2, $3, $4, now())
            ON CONFLICT (user_id) DO UPDATE SET
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                accuracy = EXCLUDED.accuracy,
                updated_at = now()
            RETURNING user_id, latitude, longitude, accuracy, updated_at
            "#,
        )
        .bind(user_id)
        .bind(latitude)
        .bind(longitude)
        .bind(accuracy)
        .fetch_one(db)
        .await?;
        Ok(row)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PushSubscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub created_at: OffsetDateTime,
}

impl PushSubscription {
    pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<PushSubscription>> {
        let rows = sqlx::query_as::<_, PushSubscription>(
            r#"
            SELECT id, user_id, endpoint, p256dh, auth, created_at
            FROM push_subscriptions
            WHERE user_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Keyed on endpoint: a browser re-registering (possibly under another
    /// account) moves the subscription instead of duplicating it.
    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        endpoint: &str,
        p256dh: &str,
        auth: &str,
    ) -> anyhow::Result<PushSubscription> {
        let row = sqlx::query_as::<_, PushSubscription>(
            r#"
            INSERT INTO push_subscriptions (user_id, endpoint, p256dh, auth)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (endpoint) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                p256dh = EXCLUDED.p256dh,
                auth = EXCLUDED.auth
            RETURNING id, user_id, endpoint, p256dh, auth, created_at
            "#,
        )
        .bind(user_id)
        .bind(endpoint)
        .bind(p256dh)
        .bind(auth)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM push_subscriptions WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn delete_by_endpoint(
        db: &PgPool,
        user_id: Uuid,
        endpoint: &str,
    ) -> anyhow::Result<bool> {
        let result =
            sqlx::query("DELETE FROM push_subscriptions WHERE user_id = $1 AND endpoint = $2")
                .bind(user_id)
                .bind(endpoint)
                .execute(db)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
