use serde::Deserialize;

/// Errors from [`crate::api::ApiClient`] calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("API error ({status}, {code}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable error code, e.g. `NOT_FOUND`.
        code: String,
        /// Human-readable message from the server.
        message: String,
    },

    /// A call that needs a token was made before logging in.
    #[error("Not logged in")]
    NotAuthenticated,
}

impl ClientError {
    /// Whether the server rejected the call because the record is missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }
}

/// Error body produced by the server: `{"error": ..., "code": ...}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub code: String,
}

/// Build a [`ClientError::Api`] from a status and raw body.
///
/// Bodies that are not the server's JSON error shape are kept verbatim.
pub(crate) fn api_error(status: u16, body: &str) -> ClientError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => ClientError::Api {
            status,
            code: parsed.code,
            message: parsed.error,
        },
        Err(_) => ClientError::Api {
            status,
            code: String::new(),
            message: body.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn json_error_body_is_parsed() {
        let err = api_error(404, r#"{"error":"Event with id 7 not found","code":"NOT_FOUND"}"#);
        assert!(err.is_not_found());
        assert_matches!(
            err,
            ClientError::Api { code, message, .. }
                if code == "NOT_FOUND" && message == "Event with id 7 not found"
        );
    }

    #[test]
    fn plain_text_body_is_kept() {
        let err = api_error(400, "Failed to deserialize query string");
        assert_eq!(
            err.to_string(),
            "API error (400, ): Failed to deserialize query string"
        );
        assert!(!err.is_not_found());
    }
}
