//! Access roles granted by the two shared passwords.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// What a token holder may do. Serialized in lowercase (`"editor"`,
/// `"admin"`) in tokens and responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Public-password holder: descriptions, links and photos.
    Editor,
    /// Admin-password holder: everything, including events, categories and
    /// settings.
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }

    /// Token subject for holders of this role's password.
    pub fn subject(self) -> &'static str {
        match self {
            Role::Editor => "public_user",
            Role::Admin => "admin_user",
        }
    }

    /// Admins inherit every editor permission.
    pub fn can_edit(self) -> bool {
        matches!(self, Role::Editor | Role::Admin)
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "editor" => Ok(Role::Editor),
            "admin" => Ok(Role::Admin),
            other => Err(CoreError::Unauthorized(format!("Unknown role '{other}'"))),
        }
    }
}
