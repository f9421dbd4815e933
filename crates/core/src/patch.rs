//! Three-state fields for partial updates.
//!
//! A JSON body cannot express "leave this alone" and "clear this" with a
//! plain `Option<T>`: both decode to `None`. [`PatchField`] keeps the two
//! apart by deriving its state from key presence. Pair it with
//! `#[serde(default)]` on the DTO field so a missing key becomes
//! [`PatchField::Absent`] while an explicit `null` becomes
//! [`PatchField::Null`].
//!
//! ```
//! use eventplan_core::patch::PatchField;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Body {
//!     #[serde(default)]
//!     description: PatchField<String>,
//! }
//!
//! let omitted: Body = serde_json::from_str("{}").unwrap();
//! let cleared: Body = serde_json::from_str(r#"{"description": null}"#).unwrap();
//! assert!(omitted.description.is_absent());
//! assert_eq!(cleared.description, PatchField::Null);
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Per-field state of a partial update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchField<T> {
    /// Key missing from the payload. The stored value is left untouched.
    Absent,
    /// Key present with `null` (or, for text, a blank string).
    Null,
    /// Key present with a usable value.
    Value(T),
}

/// The effect a resolved [`PatchField`] has on the stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchEffect<T> {
    Keep,
    Clear,
    Set(T),
}

impl<T> PatchField<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, PatchField::Absent)
    }

    pub fn is_present(&self) -> bool {
        !self.is_absent()
    }

    pub fn as_ref(&self) -> PatchField<&T> {
        match self {
            PatchField::Absent => PatchField::Absent,
            PatchField::Null => PatchField::Null,
            PatchField::Value(v) => PatchField::Value(v),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PatchField<U> {
        match self {
            PatchField::Absent => PatchField::Absent,
            PatchField::Null => PatchField::Null,
            PatchField::Value(v) => PatchField::Value(f(v)),
        }
    }

    /// The value to write when present, `None` for both `Absent` and `Null`.
    ///
    /// Only meaningful together with [`PatchField::is_present`].
    pub fn value(&self) -> Option<&T> {
        match self {
            PatchField::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn effect(self) -> PatchEffect<T> {
        match self {
            PatchField::Absent => PatchEffect::Keep,
            PatchField::Null => PatchEffect::Clear,
            PatchField::Value(v) => PatchEffect::Set(v),
        }
    }

    /// Apply this field to the currently stored value.
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self.effect() {
            PatchEffect::Keep => current,
            PatchEffect::Clear => None,
            PatchEffect::Set(v) => Some(v),
        }
    }

    /// Reject `Null` for a column that cannot hold "no value".
    pub fn required(self, field: &str) -> Result<Self, CoreError> {
        match self {
            PatchField::Null => Err(CoreError::validation(format!(
                "{field} cannot be cleared"
            ))),
            other => Ok(other),
        }
    }
}

impl PatchField<String> {
    /// Trim text values; a blank string is treated exactly like `null`.
    pub fn normalized(self) -> Self {
        match self {
            PatchField::Value(v) => match normalize_text(Some(v)) {
                Some(trimmed) => PatchField::Value(trimmed),
                None => PatchField::Null,
            },
            other => other,
        }
    }

    /// Reject a value longer than `max` characters.
    pub fn max_chars(self, field: &str, max: usize) -> Result<Self, CoreError> {
        check_max_chars(field, self.value().map(String::as_str), max)?;
        Ok(self)
    }
}

impl<T> Default for PatchField<T> {
    fn default() -> Self {
        PatchField::Absent
    }
}

impl<T> From<Option<T>> for PatchField<T> {
    /// Build a *present* field: `None` means "clear".
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => PatchField::Value(v),
            None => PatchField::Null,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for PatchField<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Only called when the key is present; absence comes from `Default`.
        Option::<T>::deserialize(deserializer).map(PatchField::from)
    }
}

impl<T: Serialize> Serialize for PatchField<T> {
    /// Serializes `Absent` and `Null` alike; use
    /// `#[serde(skip_serializing_if = "PatchField::is_absent")]` to omit the key.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PatchField::Value(v) => serializer.serialize_some(v),
            _ => serializer.serialize_none(),
        }
    }
}

/// Trim optional free text, mapping blank input to `None`.
pub fn normalize_text(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}

/// Column widths count characters, not bytes.
pub fn check_max_chars(field: &str, value: Option<&str>, max: usize) -> Result<(), CoreError> {
    match value {
        Some(v) if v.chars().count() > max => Err(CoreError::validation(format!(
            "{field} must be at most {max} characters"
        ))),
        _ => Ok(()),
    }
}
