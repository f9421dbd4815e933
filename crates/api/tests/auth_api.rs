//! HTTP-level integration tests for the `/auth` endpoints and role checks.
//!
//! Tests cover both logins, token checks, missing configuration, role
//! enforcement on editor and admin routes, and password changes.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, editor_token, get, get_auth, post_json, post_json_forwarded,
    post_json_from, put_json_auth, seed_passwords, ADMIN_PASSWORD, PUBLIC_PASSWORD,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_public_login_grants_editor(pool: PgPool) {
    seed_passwords(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "password": PUBLIC_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["data"]["access_token"].is_string());
    assert_eq!(json["data"]["token_type"], "bearer");
    assert_eq!(json["data"]["role"], "editor");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_login_grants_admin(pool: PgPool) {
    seed_passwords(&pool).await;
    let app = common::build_test_app(pool);

    let token = admin_token(app.clone()).await;
    let response = get_auth(app, "/api/v1/auth/check", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["authenticated"], true);
    assert_eq!(json["data"]["role"], "admin");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_passwords_are_not_interchangeable(pool: PgPool) {
    seed_passwords(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/login",
        serde_json::json!({ "password": ADMIN_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "Invalid password");

    let response = post_json(
        app,
        "/api/v1/auth/admin/login",
        serde_json::json!({ "password": PUBLIC_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_without_configured_password_is_500(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "password": "anything" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INTERNAL_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_body_missing_password_is_400(pool: PgPool) {
    seed_passwords(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json(app, "/api/v1/auth/login", serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Token checks and role enforcement
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_check_requires_valid_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/auth/check").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app, "/api/v1/auth/check", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid or expired token");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_editor_cannot_use_admin_routes(pool: PgPool) {
    seed_passwords(&pool).await;
    let app = common::build_test_app(pool);
    let token = editor_token(app.clone()).await;

    let response = get_auth(app, "/api/v1/admin/events", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "FORBIDDEN");
}

// ---------------------------------------------------------------------------
// Password changes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_change_public_password(pool: PgPool) {
    seed_passwords(&pool).await;
    let app = common::build_test_app(pool);
    let token = admin_token(app.clone()).await;

    let response = put_json_auth(
        app.clone(),
        "/api/v1/admin/settings/password",
        serde_json::json!({ "old_password": "wrong", "new_password": "new-public" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Current password is incorrect");

    let response = put_json_auth(
        app.clone(),
        "/api/v1/admin/settings/password",
        serde_json::json!({ "old_password": PUBLIC_PASSWORD, "new_password": "abc" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let response = put_json_auth(
        app.clone(),
        "/api/v1/admin/settings/password",
        serde_json::json!({ "old_password": PUBLIC_PASSWORD, "new_password": "new-public" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["message"], "Public password updated successfully");

    let old = post_json(
        app.clone(),
        "/api/v1/auth/login",
        serde_json::json!({ "password": PUBLIC_PASSWORD }),
    )
    .await;
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    let new = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "password": "new-public" }),
    )
    .await;
    assert_eq!(new.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_change_admin_password(pool: PgPool) {
    seed_passwords(&pool).await;
    let app = common::build_test_app(pool);
    let token = admin_token(app.clone()).await;

    let response = put_json_auth(
        app.clone(),
        "/api/v1/admin/settings/admin-password",
        serde_json::json!({ "old_password": ADMIN_PASSWORD, "new_password": "new-admin" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Tokens issued before the change stay valid until they expire.
    let response = get_auth(app.clone(), "/api/v1/auth/check", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        app,
        "/api/v1/auth/admin/login",
        serde_json::json!({ "password": "new-admin" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_reports_database_and_storage(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["storage_healthy"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_degraded_without_upload_root(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("not-created");
    let app = common::build_test_app_with_uploads(pool, &missing);

    let json = body_json(get(app, "/health").await).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["storage_healthy"], false);
}

// ---------------------------------------------------------------------------
// Login throttling
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_attempts_are_limited_per_client(pool: PgPool) {
    seed_passwords(&pool).await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::test_config(dir.path());
    config.login_attempts_per_minute = 2;
    let app = common::build_test_app_with_config(pool, config);

    let wrong = serde_json::json!({ "password": "guess" });
    for _ in 0..2 {
        let response = post_json_from(
            app.clone(),
            "/api/v1/auth/login",
            wrong.clone(),
            "203.0.113.7",
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused once the budget is spent, and the
    // admin endpoint shares the same budget.
    let right = serde_json::json!({ "password": PUBLIC_PASSWORD });
    let response = post_json_from(
        app.clone(),
        "/api/v1/auth/login",
        right.clone(),
        "203.0.113.7",
    )
    .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));
    let json = body_json(response).await;
    assert_eq!(json["code"], "RATE_LIMITED");

    let admin = serde_json::json!({ "password": ADMIN_PASSWORD });
    let response = post_json_from(
        app.clone(),
        "/api/v1/auth/admin/login",
        admin,
        "203.0.113.7",
    )
    .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Another client is unaffected.
    let response = post_json_from(app, "/api/v1/auth/login", right, "198.51.100.1").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rotating_forwarded_header_does_not_reset_budget(pool: PgPool) {
    seed_passwords(&pool).await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::test_config(dir.path());
    config.login_attempts_per_minute = 2;
    let app = common::build_test_app_with_config(pool, config);

    let wrong = serde_json::json!({ "password": "guess" });
    let mut statuses = Vec::new();
    for i in 0..5 {
        let forwarded = format!("198.51.100.{i}");
        let response = post_json_forwarded(
            app.clone(),
            "/api/v1/auth/login",
            wrong.clone(),
            "203.0.113.7",
            Some(&forwarded),
        )
        .await;
        statuses.push(response.status());
    }

    assert_eq!(
        statuses,
        [
            StatusCode::UNAUTHORIZED,
            StatusCode::UNAUTHORIZED,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS,
        ]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_trusted_proxy_header_separates_clients(pool: PgPool) {
    seed_passwords(&pool).await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::test_config(dir.path());
    config.login_attempts_per_minute = 1;
    config.trust_proxy_headers = true;
    let app = common::build_test_app_with_config(pool, config);

    let wrong = serde_json::json!({ "password": "guess" });
    let proxy = "10.0.0.1";

    let response = post_json_forwarded(
        app.clone(),
        "/api/v1/auth/login",
        wrong.clone(),
        proxy,
        Some("203.0.113.7"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json_forwarded(
        app.clone(),
        "/api/v1/auth/login",
        wrong.clone(),
        proxy,
        Some("203.0.113.7"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Same proxy, different client behind it.
    let response = post_json_forwarded(
        app,
        "/api/v1/auth/login",
        wrong,
        proxy,
        Some("198.51.100.1"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
