//! Repository for the `photos` table.
//!
//! Rows only record where the files live; writing and removing the files
//! themselves is the caller's job.

use eventplan_core::types::DbId;
use sqlx::PgPool;

use crate::models::photo::{CreatePhoto, Photo};

/// Column list for `photos` queries.
const COLUMNS: &str = "\
    id, event_id, filename, original_path, thumbnail_path, \
    file_size, created_at";

/// Stored file locations of one photo.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PhotoFiles {
    pub original_path: String,
    pub thumbnail_path: String,
}

/// Provides data access for photos.
pub struct PhotoRepo;

impl PhotoRepo {
    /// Record a processed upload.
    pub async fn create(pool: &PgPool, dto: &CreatePhoto) -> Result<Photo, sqlx::Error> {
        let query = format!(
            "INSERT INTO photos (event_id, filename, original_path, thumbnail_path, file_size) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Photo>(&query)
            .bind(dto.event_id)
            .bind(&dto.filename)
            .bind(&dto.original_path)
            .bind(&dto.thumbnail_path)
            .bind(dto.file_size)
            .fetch_one(pool)
            .await
    }

    /// Find a photo by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Photo>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM photos WHERE id = $1");
        sqlx::query_as::<_, Photo>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the photos of one event, newest first.
    pub async fn list_by_event(pool: &PgPool, event_id: DbId) -> Result<Vec<Photo>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM photos WHERE event_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Photo>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// List the photos of several events at once, newest first.
    pub async fn list_by_event_ids(
        pool: &PgPool,
        event_ids: &[DbId],
    ) -> Result<Vec<Photo>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM photos \
             WHERE event_id = ANY($1) ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Photo>(&query)
            .bind(event_ids)
            .fetch_all(pool)
            .await
    }

    /// File locations of every photo of an event.
    ///
    /// Read before deleting the event so the files can be removed after the
    /// cascade.
    pub async fn files_for_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<PhotoFiles>, sqlx::Error> {
        sqlx::query_as::<_, PhotoFiles>(
            "SELECT original_path, thumbnail_path FROM photos WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
    }

    /// File locations of every photo of every event in a category.
    pub async fn files_for_category(
        pool: &PgPool,
        category_id: DbId,
    ) -> Result<Vec<PhotoFiles>, sqlx::Error> {
        sqlx::query_as::<_, PhotoFiles>(
            "SELECT p.original_path, p.thumbnail_path \
             FROM photos p \
             JOIN events e ON e.id = p.event_id \
             WHERE e.category_id = $1",
        )
        .bind(category_id)
        .fetch_all(pool)
        .await
    }

    /// Delete a photo row by ID.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM photos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
