//! Photo models and DTOs.

use eventplan_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `photos` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Photo {
    pub id: DbId,
    pub event_id: DbId,
    pub filename: String,
    pub original_path: String,
    pub thumbnail_path: String,
    pub file_size: i64,
    pub created_at: Timestamp,
}

/// Width of `photos.filename`.
pub const FILENAME_MAX_CHARS: usize = 255;

/// Shorten a client-supplied file name to fit `photos.filename`, keeping a
/// short extension when there is one.
pub fn fit_filename(name: &str) -> String {
    if name.chars().count() <= FILENAME_MAX_CHARS {
        return name.to_string();
    }
    let ext = name
        .rfind('.')
        .map(|i| &name[i..])
        .filter(|ext| ext.chars().count() <= 10)
        .unwrap_or("");
    let stem_chars = FILENAME_MAX_CHARS - ext.chars().count();
    let stem: String = name.chars().take(stem_chars).collect();
    format!("{stem}{ext}")
}

/// DTO for recording a processed upload.
#[derive(Debug, Clone)]
pub struct CreatePhoto {
    pub event_id: DbId,
    pub filename: String,
    pub original_path: String,
    pub thumbnail_path: String,
    pub file_size: i64,
}

/// Result of a batch upload: created photos plus per-file error strings for
/// files the server rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoUploadResponse {
    pub photos: Vec<Photo>,
    pub errors: Vec<String>,
}
