#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use eventplan_api::auth::jwt::JwtConfig;
use eventplan_api::auth::password::hash_password;
use eventplan_api::config::{ServerConfig, UploadConfig};
use eventplan_api::routes;
use eventplan_api::state::AppState;
use eventplan_db::models::setting::{KEY_ADMIN_PASSWORD, KEY_PUBLIC_PASSWORD};
use eventplan_db::repositories::SettingRepo;

/// Plaintext public password stored by [`seed_passwords`].
pub const PUBLIC_PASSWORD: &str = "public123";
/// Plaintext admin password stored by [`seed_passwords`].
pub const ADMIN_PASSWORD: &str = "admin123";

/// Build a test `ServerConfig` with safe defaults and the given upload root.
pub fn test_config(upload_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_days: 1,
        },
        upload: UploadConfig {
            upload_dir: upload_dir.to_path_buf(),
            max_upload_size_mb: 1,
            thumbnail_size: 400,
            thumbnail_quality: 85,
        },
        initial_public_password: None,
        initial_admin_password: None,
        // Tests log in many times from the same "client".
        login_attempts_per_minute: 0,
        trust_proxy_headers: false,
    }
}

/// Build the full application router using a shared scratch upload root,
/// created if needed.
///
/// Stored file names are random, so tests sharing the directory never
/// collide.
pub fn build_test_app(pool: PgPool) -> Router {
    let dir: PathBuf = std::env::temp_dir().join("eventplan-api-tests");
    std::fs::create_dir_all(&dir).expect("scratch upload dir should be creatable");
    build_test_app_with_uploads(pool, &dir)
}

/// Build the full application router with all middleware layers.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app_with_uploads(pool: PgPool, upload_dir: &Path) -> Router {
    build_test_app_with_config(pool, test_config(upload_dir))
}

/// Build the full application router around an explicit configuration.
pub fn build_test_app_with_config(pool: PgPool, config: ServerConfig) -> Router {
    let upload_dir = config.upload.upload_dir.clone();
    let state = AppState::new(pool, config);

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .nest_service("/uploads", ServeDir::new(&upload_dir))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Auth helpers
// ---------------------------------------------------------------------------

/// Store argon2 hashes of [`PUBLIC_PASSWORD`] and [`ADMIN_PASSWORD`].
pub async fn seed_passwords(pool: &PgPool) {
    let public = hash_password(PUBLIC_PASSWORD).expect("hashing should succeed");
    let admin = hash_password(ADMIN_PASSWORD).expect("hashing should succeed");
    SettingRepo::set(pool, KEY_PUBLIC_PASSWORD, &public)
        .await
        .expect("seeding public password should succeed");
    SettingRepo::set(pool, KEY_ADMIN_PASSWORD, &admin)
        .await
        .expect("seeding admin password should succeed");
}

/// Log in through the API and return the access token.
pub async fn login(app: Router, path: &str, password: &str) -> String {
    let response = post_json(app, path, serde_json::json!({ "password": password })).await;
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");
    let json = body_json(response).await;
    json["data"]["access_token"]
        .as_str()
        .expect("response must contain access_token")
        .to_string()
}

/// Editor token from the public password.
pub async fn editor_token(app: Router) -> String {
    login(app, "/api/v1/auth/login", PUBLIC_PASSWORD).await
}

/// Admin token from the admin password.
pub async fn admin_token(app: Router) -> String {
    login(app, "/api/v1/auth/admin/login", ADMIN_PASSWORD).await
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

/// Collect a response body into bytes.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

/// Send a request through the router.
pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("router is infallible")
}

fn json_request(
    method: Method,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, empty_request(Method::GET, uri, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::GET, uri, Some(token))).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::POST, uri, body, None)).await
}

/// POST from the TCP peer `peer_ip`, as `into_make_service_with_connect_info`
/// would record it.
pub async fn post_json_from(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    peer_ip: &str,
) -> Response {
    post_json_forwarded(app, uri, body, peer_ip, None).await
}

/// POST from `peer_ip`, optionally carrying an `X-Forwarded-For` header.
pub async fn post_json_forwarded(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    peer_ip: &str,
    forwarded_for: Option<&str>,
) -> Response {
    let mut request = json_request(Method::POST, uri, body, None);
    let peer: SocketAddr = format!("{peer_ip}:40000").parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    if let Some(forwarded_for) = forwarded_for {
        request
            .headers_mut()
            .insert("x-forwarded-for", forwarded_for.parse().unwrap());
    }
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request(Method::POST, uri, body, Some(token))).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::PATCH, uri, body, None)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request(Method::PATCH, uri, body, Some(token))).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request(Method::PUT, uri, body, Some(token))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::DELETE, uri, Some(token))).await
}
