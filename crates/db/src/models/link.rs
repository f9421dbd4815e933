//! Event link models and DTOs.

use eventplan_core::error::CoreError;
use eventplan_core::patch::{check_max_chars, normalize_text};
use eventplan_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `event_links` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct EventLink {
    pub id: DbId,
    pub event_id: DbId,
    pub url: String,
    pub title: Option<String>,
    pub created_at: Timestamp,
}

/// Width of `event_links.title`.
pub const TITLE_MAX_CHARS: usize = 255;

/// DTO for attaching a link to an event.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLink {
    pub url: String,
    pub title: Option<String>,
}

impl CreateLink {
    /// Trim both fields; the URL must be absolute http(s) and the title
    /// must fit its column.
    pub fn normalized(self) -> Result<Self, CoreError> {
        let url = normalize_text(Some(self.url))
            .ok_or_else(|| CoreError::validation("url must not be empty"))?;
        let lower = url.to_ascii_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(CoreError::validation(
                "url must start with http:// or https://",
            ));
        }
        let title = normalize_text(self.title);
        check_max_chars("title", title.as_deref(), TITLE_MAX_CHARS)?;
        Ok(Self { url, title })
    }
}
