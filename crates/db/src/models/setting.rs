//! Key/value settings.

/// Argon2 hash of the password that grants the editor role.
pub const KEY_PUBLIC_PASSWORD: &str = "public_password";

/// Argon2 hash of the password that grants the admin role.
pub const KEY_ADMIN_PASSWORD: &str = "admin_password";
