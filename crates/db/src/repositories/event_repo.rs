//! Repository for the `events` table.

use eventplan_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{CreateEvent, Event, UpdateEvent};

/// Column list for `events` queries.
const COLUMNS: &str = "\
    id, category_id, number, name, event_date, responsible, location, \
    description, sort_order, created_at, updated_at";

/// Provides CRUD operations for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event, returning the created row.
    pub async fn create(pool: &PgPool, dto: &CreateEvent) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events \
                 (category_id, number, name, event_date, responsible, location, \
                  description, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(dto.category_id)
            .bind(&dto.number)
            .bind(&dto.name)
            .bind(&dto.event_date)
            .bind(&dto.responsible)
            .bind(&dto.location)
            .bind(&dto.description)
            .bind(dto.sort_order)
            .fetch_one(pool)
            .await
    }

    /// Find an event by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the events of several categories, ordered by `sort_order`.
    pub async fn list_by_category_ids(
        pool: &PgPool,
        category_ids: &[DbId],
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events \
             WHERE category_id = ANY($1) ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(category_ids)
            .fetch_all(pool)
            .await
    }

    /// Apply a normalized partial update.
    ///
    /// An all-absent patch performs no write and returns the stored row.
    /// Otherwise a single `UPDATE` runs: nullable columns use
    /// `CASE WHEN <provided> THEN <value> ELSE <column> END` so that an
    /// explicit null clears them, required columns use `COALESCE` because
    /// [`UpdateEvent::normalized`] has already rejected null for them.
    ///
    /// Returns `None` if the event does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        dto: &UpdateEvent,
    ) -> Result<Option<Event>, sqlx::Error> {
        if dto.is_noop() {
            return Self::find_by_id(pool, id).await;
        }

        let query = format!(
            "UPDATE events SET \
                 number      = CASE WHEN $2 THEN $3 ELSE number END, \
                 name        = COALESCE($4, name), \
                 event_date  = CASE WHEN $5 THEN $6 ELSE event_date END, \
                 responsible = CASE WHEN $7 THEN $8 ELSE responsible END, \
                 location    = CASE WHEN $9 THEN $10 ELSE location END, \
                 description = CASE WHEN $11 THEN $12 ELSE description END, \
                 sort_order  = COALESCE($13, sort_order), \
                 category_id = COALESCE($14, category_id), \
                 updated_at  = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(dto.number.is_present())
            .bind(dto.number.value().map(String::as_str))
            .bind(dto.name.value().map(String::as_str))
            .bind(dto.event_date.is_present())
            .bind(dto.event_date.value().map(String::as_str))
            .bind(dto.responsible.is_present())
            .bind(dto.responsible.value().map(String::as_str))
            .bind(dto.location.is_present())
            .bind(dto.location.value().map(String::as_str))
            .bind(dto.description.is_present())
            .bind(dto.description.value().map(String::as_str))
            .bind(dto.sort_order.value().copied())
            .bind(dto.category_id.value().copied())
            .fetch_optional(pool)
            .await
    }

    /// Delete an event by ID. Links and photo rows cascade.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
