use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode, header::AUTHORIZATION};
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use uuid::Uuid;

use fusion_shop::infra::mail::MailTransport;
use fusion_shop::infra::storage::LocalBlobStore;
use fusion_shop::router::build_router;
use fusion_shop::state::AppState;
use fusion_shop::usecase::auth::TokenSettings;

use crate::helpers::{TEST_JWT_SECRET, TestAuth};

/// Router over a disconnected database: only paths that fail before the
/// store is reached are exercised.
fn server(upload_dir: &std::path::Path) -> TestServer {
    let state = AppState {
        db: DatabaseConnection::Disconnected,
        tokens: TokenSettings {
            jwt_secret: TEST_JWT_SECRET.to_owned(),
            access_ttl: Duration::from_secs(900),
            refresh_ttl: Duration::from_secs(3600),
        },
        mailer: MailTransport::Log,
        blobs: LocalBlobStore::new(upload_dir),
        verification_ttl_secs: 3600,
        max_avatar_bytes: 1024,
    };
    TestServer::new(build_router(state)).unwrap()
}

fn bearer(value: &str) -> (HeaderName, HeaderValue) {
    (AUTHORIZATION, HeaderValue::from_str(value).unwrap())
}

#[tokio::test]
async fn should_answer_healthz() {
    let dir = tempfile::tempdir().unwrap();
    let response = server(dir.path()).get("/healthz").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn should_report_not_ready_without_database() {
    let dir = tempfile::tempdir().unwrap();
    let response = server(dir.path()).get("/readyz").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn should_attach_request_id() {
    let dir = tempfile::tempdir().unwrap();
    let response = server(dir.path()).get("/healthz").await;
    let id = response.header("x-request-id");
    assert!(Uuid::parse_str(id.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn should_reject_missing_token() {
    let dir = tempfile::tempdir().unwrap();
    let response = server(dir.path()).get("/users/me").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["kind"], "MISSING_TOKEN");
}

#[tokio::test]
async fn should_reject_malformed_and_forged_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(dir.path());
    let forged = TestAuth::new(Uuid::now_v7()).with_secret("another-secret");
    let refresh = TestAuth::new(Uuid::now_v7()).refresh_token(Uuid::now_v7());

    for value in [
        "Basic dXNlcjpwYXNz".to_owned(),
        "Bearer not-a-jwt".to_owned(),
        format!("Bearer {}", forged.access_token()),
        format!("Bearer {refresh}"),
    ] {
        let (name, header) = bearer(&value);
        let response = server.get("/orders").add_header(name, header).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["kind"], "INVALID_TOKEN", "header {value}");
    }
}

#[tokio::test]
async fn should_reject_unparsable_json_body() {
    let dir = tempfile::tempdir().unwrap();
    let response = server(dir.path())
        .post("/auth/login")
        .text("{not json")
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INVALID_BODY");
}

#[tokio::test]
async fn should_reject_invalid_registration_before_touching_store() {
    let dir = tempfile::tempdir().unwrap();
    let response = server(dir.path())
        .post("/auth/register")
        .json(&json!({
            "username": "bob",
            "email": "bob@x.com",
            "password": "short",
            "redirect_url": "https://shop.example.com/verify",
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INVALID_FIELD");
    assert_eq!(body["message"], "invalid field: password");
}

#[tokio::test]
async fn should_reject_non_uuid_path() {
    let dir = tempfile::tempdir().unwrap();
    let response = server(dir.path()).get("/products/not-a-uuid").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INVALID_PATH");
}

#[tokio::test]
async fn should_reject_refresh_with_access_token() {
    let dir = tempfile::tempdir().unwrap();
    let access = TestAuth::new(Uuid::now_v7()).access_token();
    let response = server(dir.path())
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": access }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INVALID_REFRESH_TOKEN");
}

#[tokio::test]
async fn should_serve_uploaded_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("avatars")).unwrap();
    std::fs::write(dir.path().join("avatars/a.png"), b"png-bytes").unwrap();

    let response = server(dir.path()).get("/uploads/avatars/a.png").await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"png-bytes");
}
