//! Category (month section) models and DTOs.

use eventplan_core::error::CoreError;
use eventplan_core::patch::{check_max_chars, normalize_text};
use eventplan_core::search::EventGroup;
use eventplan_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::event::EventWithRelations;

/// A row from the `categories` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub month: i32,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A category together with its events, as returned by schedule reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWithEvents {
    pub id: DbId,
    pub name: String,
    pub month: i32,
    pub sort_order: i32,
    pub events: Vec<EventWithRelations>,
}

impl CategoryWithEvents {
    pub fn new(category: Category, events: Vec<EventWithRelations>) -> Self {
        Self {
            id: category.id,
            name: category.name,
            month: category.month,
            sort_order: category.sort_order,
            events,
        }
    }
}

impl EventGroup for CategoryWithEvents {
    type Event = EventWithRelations;

    fn events(&self) -> &[EventWithRelations] {
        &self.events
    }

    fn with_events(&self, events: Vec<EventWithRelations>) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            month: self.month,
            sort_order: self.sort_order,
            events,
        }
    }
}

/// Width of `categories.name`.
pub const NAME_MAX_CHARS: usize = 255;

/// DTO for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub month: i32,
    #[serde(default)]
    pub sort_order: i32,
}

impl CreateCategory {
    /// Trim the name, check its width and the month range.
    pub fn normalized(self) -> Result<Self, CoreError> {
        let name = normalize_text(Some(self.name))
            .ok_or_else(|| CoreError::validation("name must not be empty"))?;
        check_max_chars("name", Some(&name), NAME_MAX_CHARS)?;
        validate_month(self.month)?;
        Ok(Self {
            name,
            month: self.month,
            sort_order: self.sort_order,
        })
    }
}

/// Months are numbered 1 (January) through 12 (December).
pub fn validate_month(month: i32) -> Result<(), CoreError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "month must be between 1 and 12, got {month}"
        )))
    }
}
