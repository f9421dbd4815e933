use std::path::PathBuf;

use eventplan_core::photo::{DEFAULT_THUMBNAIL_QUALITY, DEFAULT_THUMBNAIL_SIZE};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`).
    pub request_timeout_secs: u64,
    /// JWT token configuration.
    pub jwt: JwtConfig,
    /// Photo storage and processing settings.
    pub upload: UploadConfig,
    /// Plaintext public password seeded into `settings` on first start.
    pub initial_public_password: Option<String>,
    /// Plaintext admin password seeded into `settings` on first start.
    pub initial_admin_password: Option<String>,
    /// Login attempts allowed per client per minute; `0` disables the
    /// limit (default: `5`).
    pub login_attempts_per_minute: u32,
    /// Charge login attempts to the first `X-Forwarded-For` hop instead of
    /// the TCP peer. Enable only behind a proxy that overwrites the header
    /// (default: `false`).
    pub trust_proxy_headers: bool,
}

/// Where photos are stored and how they are processed.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Root directory for originals and thumbnails (default: `./uploads`).
    pub upload_dir: PathBuf,
    /// Largest accepted file, in megabytes (default: `100`).
    pub max_upload_size_mb: u64,
    /// Bounding box of generated thumbnails in pixels (default: `400`).
    pub thumbnail_size: u32,
    /// JPEG quality of generated thumbnails (default: `85`).
    pub thumbnail_quality: u8,
}

impl UploadConfig {
    /// Largest accepted file, in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.max_upload_size_mb * 1024 * 1024).unwrap_or(usize::MAX)
    }

    /// Load upload settings from environment variables with defaults.
    ///
    /// | Env Var             | Default     |
    /// |---------------------|-------------|
    /// | `UPLOAD_DIR`        | `./uploads` |
    /// | `MAX_UPLOAD_SIZE_MB`| `100`       |
    /// | `THUMBNAIL_SIZE`    | `400`       |
    /// | `THUMBNAIL_QUALITY` | `85`        |
    pub fn from_env() -> Self {
        let upload_dir = std::env::var("UPLOAD_DIR")
            .unwrap_or_else(|_| "./uploads".into())
            .into();

        let max_upload_size_mb: u64 = std::env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| "100".into())
            .parse()
            .expect("MAX_UPLOAD_SIZE_MB must be a valid u64");

        let thumbnail_size: u32 = std::env::var("THUMBNAIL_SIZE")
            .unwrap_or_else(|_| DEFAULT_THUMBNAIL_SIZE.to_string())
            .parse()
            .expect("THUMBNAIL_SIZE must be a valid u32");

        let thumbnail_quality: u8 = std::env::var("THUMBNAIL_QUALITY")
            .unwrap_or_else(|_| DEFAULT_THUMBNAIL_QUALITY.to_string())
            .parse()
            .expect("THUMBNAIL_QUALITY must be a valid u8");
        assert!(
            (1..=100).contains(&thumbnail_quality),
            "THUMBNAIL_QUALITY must be between 1 and 100"
        );

        Self {
            upload_dir,
            max_upload_size_mb,
            thumbnail_size,
            thumbnail_quality,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `8000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `120`                   |
    /// | `INITIAL_PUBLIC_PASSWORD` | unset                   |
    /// | `INITIAL_ADMIN_PASSWORD`  | unset                   |
    /// | `LOGIN_RATE_LIMIT`        | `5`                     |
    /// | `TRUST_PROXY_HEADERS`     | `false`                 |
    ///
    /// See [`JwtConfig::from_env`] and [`UploadConfig::from_env`] for the
    /// remaining variables.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Large photo batches need more than the usual 30 seconds.
        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let initial_public_password = std::env::var("INITIAL_PUBLIC_PASSWORD")
            .ok()
            .filter(|s| !s.is_empty());
        let initial_admin_password = std::env::var("INITIAL_ADMIN_PASSWORD")
            .ok()
            .filter(|s| !s.is_empty());

        let login_attempts_per_minute: u32 = std::env::var("LOGIN_RATE_LIMIT")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("LOGIN_RATE_LIMIT must be a valid u32");

        let trust_proxy_headers = std::env::var("TRUST_PROXY_HEADERS")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            upload: UploadConfig::from_env(),
            initial_public_password,
            initial_admin_password,
            login_attempts_per_minute,
            trust_proxy_headers,
        }
    }
}
