//! Domain error type shared by every layer.

use crate::types::DbId;

/// Failure of a domain operation.
///
/// The HTTP layer maps each variant onto a status code; none of them is
/// retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The target record does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// A request payload could not be normalized to the field's type.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A uniqueness rule would be violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        CoreError::NotFound { entity, id }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }
}
