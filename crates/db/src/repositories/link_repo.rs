//! Repository for the `event_links` table.

use eventplan_core::types::DbId;
use sqlx::PgPool;

use crate::models::link::{CreateLink, EventLink};

/// Column list for `event_links` queries.
const COLUMNS: &str = "id, event_id, url, title, created_at";

/// Provides data access for event links.
pub struct LinkRepo;

impl LinkRepo {
    /// Attach a link to an event.
    pub async fn create(
        pool: &PgPool,
        event_id: DbId,
        dto: &CreateLink,
    ) -> Result<EventLink, sqlx::Error> {
        let query = format!(
            "INSERT INTO event_links (event_id, url, title) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EventLink>(&query)
            .bind(event_id)
            .bind(&dto.url)
            .bind(&dto.title)
            .fetch_one(pool)
            .await
    }

    /// List the links of one event in creation order.
    pub async fn list_by_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<EventLink>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM event_links WHERE event_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, EventLink>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// List the links of several events at once.
    pub async fn list_by_event_ids(
        pool: &PgPool,
        event_ids: &[DbId],
    ) -> Result<Vec<EventLink>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM event_links \
             WHERE event_id = ANY($1) ORDER BY created_at, id"
        );
        sqlx::query_as::<_, EventLink>(&query)
            .bind(event_ids)
            .fetch_all(pool)
            .await
    }

    /// Delete a link by ID.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM event_links WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
