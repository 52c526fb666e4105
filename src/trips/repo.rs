use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trip {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_public: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const TRIP_COLUMNS: &str =
    "id, owner_id, title, description, latitude, longitude, is_public, created_at, updated_at";

impl Trip {
    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Trip>> {
        let trip = sqlx::query_as::<_, Trip>(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(trip)
    }

    pub async fn list_by_owner(
        db: &PgPool,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Trip>> {
        let rows = sqlx::query_as::<_, Trip>(&format!(
            r#"
            SELECT {TRIP_COLUMNS}
            FROM trips
            WHERE owner_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_public(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<Trip>> {
        let rows = sqlx::query_as::<_, Trip>(&format!(
            r#"
            SELECT {TRIP_COLUMNS}
            FROM trips
            WHERE is_public
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Public trips with coordinates, the candidate set for proximity
    /// matching. The requesting user's own trips are excluded.
    pub async fn public_with_coordinates(
        db: &PgPool,
        exclude_owner: Uuid,
    ) -> anyhow::Result<Vec<Trip>> {
        let rows = sqlx::query_as::<_, Trip>(&format!(
            r#"
            SELECT {TRIP_COLUMNS}
            FROM trips
            WHERE is_public
              AND latitude IS NOT NULL
              AND longitude IS NOT NULL
              AND owner_id <> $1
            "#
        ))
        .bind(exclude_owner)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        db: &PgPool,
        owner_id: Uuid,
        title: &str,
        description: Option<&str>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        is_public: bool,
    ) -> anyhow::Result<Trip> {
        let trip = sqlx::query_as::<_, Trip>(&format!(
            r#"
            INSERT INTO trips (owner_id, title, description, latitude, longitude, is_public)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TRIP_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(title)
        .bind(description)
        .bind(latitude)
        .bind(longitude)
        .bind(is_public)
        .fetch_one(db)
        .await?;
        Ok(trip)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        title: &str,
        description: Option<&str>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        is_public: bool,
    ) -> anyhow::Result<Trip> {
        let trip = sqlx::query_as::<_, Trip>(&format!(
            r#"
            UPDATE trips
            SET title = $2, description = $3, latitude = $4, longitude = $5,
                is_public = $6, updated_at = now()
            WHERE id = $1
            RETURNING {TRIP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(latitude)
        .bind(longitude)
        .bind(is_public)
        .fetch_one(db)
        .await?;
        Ok(trip)
    }

    pub async fn set_visibility(db: &PgPool, id: Uuid, is_public: bool) -> anyhow::Result<Trip> {
        let trip = sqlx::query_as::<_, Trip>(&format!(
            r#"
            UPDATE trips
            SET is_public = $2, updated_at = now()
            WHERE id = $1
            RETURNING {TRIP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(is_public)
        .fetch_one(db)
        .await?;
        Ok(trip)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
