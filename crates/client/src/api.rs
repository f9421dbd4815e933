//! REST client for the events plan API.
//!
//! Wraps the `/api/v1` endpoints the web client uses (login, schedule reads,
//! description patches) with [`reqwest`]. Successful responses arrive in a
//! `{"data": ...}` envelope which is unwrapped here.

use eventplan_core::patch::PatchField;
use eventplan_core::roles::Role;
use eventplan_core::types::DbId;
use eventplan_db::models::category::CategoryWithEvents;
use eventplan_db::models::event::EventWithRelations;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{api_error, ClientError};

/// Prefix of every API route.
const API_PREFIX: &str = "/api/v1";

/// Token and role returned by a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub role: Role,
}

/// Result of `GET /auth/check`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionInfo {
    pub authenticated: bool,
    pub role: Role,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Serialize)]
struct PasswordBody<'a> {
    password: &'a str,
}

/// Body of the editor PATCH. An absent field leaves the key out entirely.
#[derive(Serialize)]
struct DescriptionPatch {
    #[serde(skip_serializing_if = "PatchField::is_absent")]
    description: PatchField<String>,
}

/// HTTP client for one events plan server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for a server root such as `http://localhost:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            token: None,
        }
    }

    /// The bearer token in use, if logged in.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Use a token obtained elsewhere (e.g. restored from storage).
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Exchange the public password for an editor token and keep it.
    pub async fn login(&mut self, password: &str) -> Result<Session, ClientError> {
        self.login_at("/auth/login", password).await
    }

    /// Exchange the admin password for an admin token and keep it.
    pub async fn admin_login(&mut self, password: &str) -> Result<Session, ClientError> {
        self.login_at("/auth/admin/login", password).await
    }

    /// Ask the server whether the current token is still valid.
    pub async fn check(&self) -> Result<SessionInfo, ClientError> {
        let request = self.authorized(self.client.get(self.url("/auth/check")))?;
        Self::parse_response(request.send().await?).await
    }

    /// Categories of one month with their events, links and photos.
    pub async fn fetch_month(&self, month: i32) -> Result<Vec<CategoryWithEvents>, ClientError> {
        let response = self
            .client
            .get(self.url("/events"))
            .query(&[("month", month)])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// The whole year, ordered by month then sort order.
    pub async fn fetch_year(&self) -> Result<Vec<CategoryWithEvents>, ClientError> {
        let response = self.client.get(self.url("/events/all")).send().await?;
        Self::parse_response(response).await
    }

    /// One event with its links and photos.
    pub async fn fetch_event(&self, id: DbId) -> Result<EventWithRelations, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/events/{id}")))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Send the editor's description update and return the stored event.
    ///
    /// `Absent` sends `{}`, `Null` sends `{"description": null}`, a value
    /// sends it as is. The returned event is authoritative; callers should
    /// reconcile their local copy from it.
    pub async fn patch_description(
        &self,
        id: DbId,
        description: PatchField<String>,
    ) -> Result<EventWithRelations, ClientError> {
        let request = self
            .client
            .patch(self.url(&format!("/events/{id}")))
            .json(&DescriptionPatch { description });
        let response = self.authorized(request)?.send().await?;
        Self::parse_response(response).await
    }

    // ---- crate helpers ----

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    pub(crate) fn authorized(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::NotAuthenticated)?;
        Ok(request.bearer_auth(token))
    }

    // ---- private helpers ----

    async fn login_at(&mut self, path: &str, password: &str) -> Result<Session, ClientError> {
        let response = self
            .client
            .post(self.url(path))
            .json(&PasswordBody { password })
            .send()
            .await?;
        let session: Session = Self::parse_response(response).await?;
        tracing::debug!(role = %session.role, "Logged in");
        self.token = Some(session.access_token.clone());
        Ok(session)
    }

    /// Unwrap the `{"data": ...}` envelope of a 2xx response, or turn the
    /// server's error body into [`ClientError::Api`].
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(response.json::<Envelope<T>>().await?.data)
    }
}
