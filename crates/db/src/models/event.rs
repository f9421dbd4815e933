//! Event models and DTOs.
//!
//! Partial updates use [`PatchField`] so that an omitted key, an explicit
//! `null` and a value are three different requests. Editors may only touch
//! `description` ([`UpdateEventDescription`]); administrators may touch every
//! editable column ([`UpdateEvent`]). Both go through the same normalization
//! and the same repository write.

use eventplan_core::error::CoreError;
use eventplan_core::patch::{check_max_chars, normalize_text, PatchField};
use eventplan_core::search::SearchableEvent;
use eventplan_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::link::EventLink;
use super::photo::Photo;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `events` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: DbId,
    pub category_id: DbId,
    pub number: Option<String>,
    pub name: String,
    pub event_date: Option<String>,
    pub responsible: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An event with its links and photos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventWithRelations {
    #[serde(flatten)]
    pub event: Event,
    pub links: Vec<EventLink>,
    pub photos: Vec<Photo>,
}

impl SearchableEvent for Event {
    fn searchable_fields(&self) -> [Option<&str>; 5] {
        [
            Some(self.name.as_str()),
            self.responsible.as_deref(),
            self.location.as_deref(),
            self.description.as_deref(),
            self.event_date.as_deref(),
        ]
    }
}

impl SearchableEvent for EventWithRelations {
    fn searchable_fields(&self) -> [Option<&str>; 5] {
        self.event.searchable_fields()
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// Width of `events.number`.
pub const NUMBER_MAX_CHARS: usize = 20;
/// Width of `events.event_date`.
pub const EVENT_DATE_MAX_CHARS: usize = 100;

/// DTO for creating an event (admin).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvent {
    pub category_id: DbId,
    pub number: Option<String>,
    pub name: String,
    pub event_date: Option<String>,
    pub responsible: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

impl CreateEvent {
    /// Trim all text; blank optional text becomes `None`, a blank name is
    /// rejected.
    pub fn normalized(self) -> Result<Self, CoreError> {
        let name = normalize_text(Some(self.name))
            .ok_or_else(|| CoreError::validation("name must not be empty"))?;
        let number = normalize_text(self.number);
        check_max_chars("number", number.as_deref(), NUMBER_MAX_CHARS)?;
        let event_date = normalize_text(self.event_date);
        check_max_chars("event_date", event_date.as_deref(), EVENT_DATE_MAX_CHARS)?;
        Ok(Self {
            category_id: self.category_id,
            number,
            name,
            event_date,
            responsible: normalize_text(self.responsible),
            location: normalize_text(self.location),
            description: normalize_text(self.description),
            sort_order: self.sort_order,
        })
    }
}

/// DTO for the editor-facing description update.
///
/// Unknown keys are ignored; only `description` is examined.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventDescription {
    #[serde(default)]
    pub description: PatchField<String>,
}

/// DTO for the administrator's partial update of an event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEvent {
    #[serde(default)]
    pub number: PatchField<String>,
    #[serde(default)]
    pub name: PatchField<String>,
    #[serde(default)]
    pub event_date: PatchField<String>,
    #[serde(default)]
    pub responsible: PatchField<String>,
    #[serde(default)]
    pub location: PatchField<String>,
    #[serde(default)]
    pub description: PatchField<String>,
    #[serde(default)]
    pub sort_order: PatchField<i32>,
    #[serde(default)]
    pub category_id: PatchField<DbId>,
}

impl From<UpdateEventDescription> for UpdateEvent {
    fn from(dto: UpdateEventDescription) -> Self {
        Self {
            description: dto.description,
            ..Default::default()
        }
    }
}

impl UpdateEvent {
    /// Normalize text fields, reject clearing of required columns and
    /// check column widths.
    ///
    /// The whole patch is rejected if any field is invalid, so a failed
    /// call never writes anything.
    pub fn normalized(self) -> Result<Self, CoreError> {
        Ok(Self {
            number: self.number.normalized().max_chars("number", NUMBER_MAX_CHARS)?,
            name: self.name.normalized().required("name")?,
            event_date: self
                .event_date
                .normalized()
                .max_chars("event_date", EVENT_DATE_MAX_CHARS)?,
            responsible: self.responsible.normalized(),
            location: self.location.normalized(),
            description: self.description.normalized(),
            sort_order: self.sort_order.required("sort_order")?,
            category_id: self.category_id.required("category_id")?,
        })
    }

    /// True when every field is absent; such a patch performs no write.
    pub fn is_noop(&self) -> bool {
        self.number.is_absent()
            && self.name.is_absent()
            && self.event_date.is_absent()
            && self.responsible.is_absent()
            && self.location.is_absent()
            && self.description.is_absent()
            && self.sort_order.is_absent()
            && self.category_id.is_absent()
    }

    /// Apply this (normalized) patch to an in-memory copy of the event.
    ///
    /// Mirrors what the repository writes; used by callers that keep a local
    /// copy and by tests.
    pub fn apply_to(self, event: &Event) -> Event {
        let mut next = event.clone();
        next.number = self.number.apply(next.number);
        next.name = self.name.apply(Some(next.name)).unwrap_or_default();
        next.event_date = self.event_date.apply(next.event_date);
        next.responsible = self.responsible.apply(next.responsible);
        next.location = self.location.apply(next.location);
        next.description = self.description.apply(next.description);
        next.sort_order = self.sort_order.apply(Some(next.sort_order)).unwrap_or_default();
        next.category_id = self
            .category_id
            .apply(Some(next.category_id))
            .unwrap_or_default();
        next
    }
}
