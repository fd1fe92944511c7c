//! Router tests driven in-process.

use super::{LEGACY_PREFIX, app, types::LoginResponse, types::VerifyTokenResponse};
use crate::auth::{
    AuthState, RejectReason, TokenIssuer, TokenVerifier,
    testing::{ALICE_PASSWORD, alice_table, signing_key},
};
use anyhow::{Context, Result};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tower::ServiceExt;

fn test_app(failure_delay: Duration) -> Result<Router> {
    let issuer = TokenIssuer::new(alice_table(), signing_key()).with_failure_delay(failure_delay);
    let verifier = TokenVerifier::new(signing_key());
    app(Arc::new(AuthState::new(issuer, verifier)), "*")
}

async fn post_json(app: Router, uri: &str, body: Value) -> Result<Response> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body)?))?;
    Ok(app.oneshot(request).await?)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn login_token(app: Router) -> Result<String> {
    let response = post_json(
        app,
        "/login",
        json!({"identity": "alice", "password": ALICE_PASSWORD}),
    )
    .await?;
    let body: LoginResponse = read_json(response).await?;
    body.token.context("login returned no token")
}

#[tokio::test]
async fn login_with_correct_password() -> Result<()> {
    let response = post_json(
        test_app(Duration::ZERO)?,
        "/login",
        json!({"identity": "alice", "password": "correct"}),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: LoginResponse = read_json(response).await?;
    assert!(body.success);
    let token = body.token.context("missing token")?;
    assert!(!token.is_empty());
    assert_eq!(token.matches('.').count(), 2);
    Ok(())
}

#[tokio::test]
async fn login_with_wrong_password_is_slow_and_vague() -> Result<()> {
    let started = Instant::now();
    let response = post_json(
        test_app(Duration::from_secs(1))?,
        "/login",
        json!({"identity": "alice", "password": "wrong"}),
    )
    .await?;
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: Value = read_json(response).await?;
    assert_eq!(body, json!({"success": false, "error": "Invalid credentials"}));
    Ok(())
}

#[tokio::test]
async fn login_with_unknown_identity_matches_wrong_password() -> Result<()> {
    let response = post_json(
        test_app(Duration::ZERO)?,
        "/login",
        json!({"username": "mallory", "password": "correct"}),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = read_json(response).await?;
    assert_eq!(body, json!({"success": false, "error": "Invalid credentials"}));
    Ok(())
}

#[tokio::test]
async fn login_missing_fields() -> Result<()> {
    for body in [
        json!({"identity": "alice"}),
        json!({"password": "correct"}),
        json!({"identity": "", "password": "correct"}),
        json!({}),
    ] {
        let response = post_json(test_app(Duration::ZERO)?, "/login", body).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: LoginResponse = read_json(response).await?;
        assert!(!body.success);
    }

    let request = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))?;
    let response = test_app(Duration::ZERO)?.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn verify_token_after_login() -> Result<()> {
    let app = test_app(Duration::ZERO)?;
    let token = login_token(app.clone()).await?;

    let response = post_json(app, "/verify-token", json!({ "token": token })).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: VerifyTokenResponse = read_json(response).await?;
    assert!(body.valid);
    assert_eq!(body.identity.as_deref(), Some("alice"));
    assert_eq!(
        body.claim.map(|claim| claim.identity).as_deref(),
        Some("alice")
    );
    Ok(())
}

#[tokio::test]
async fn verify_token_rejections_are_not_http_errors() -> Result<()> {
    let app = test_app(Duration::ZERO)?;
    let token = login_token(app.clone()).await?;

    let response = post_json(app.clone(), "/verify-token", json!({"token": "a.b"})).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: VerifyTokenResponse = read_json(response).await?;
    assert!(!body.valid);
    assert_eq!(body.reason, Some(RejectReason::InvalidFormat));

    let tampered = format!("{token}x");
    let response = post_json(app, "/verify-token", json!({ "token": tampered })).await?;
    let body: VerifyTokenResponse = read_json(response).await?;
    assert!(!body.valid);
    assert_eq!(body.reason, Some(RejectReason::InvalidSignature));
    Ok(())
}

#[tokio::test]
async fn verify_token_missing() -> Result<()> {
    let response = post_json(test_app(Duration::ZERO)?, "/verify-token", json!({})).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_json(response).await?;
    assert_eq!(body, json!({"valid": false, "error": "Token is required"}));
    Ok(())
}

#[tokio::test]
async fn legacy_paths_are_served() -> Result<()> {
    let app = test_app(Duration::ZERO)?;
    let response = post_json(
        app.clone(),
        &format!("{LEGACY_PREFIX}/login"),
        json!({"username": "alice", "password": ALICE_PASSWORD}),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: LoginResponse = read_json(response).await?;
    let token = body.token.context("missing token")?;

    let response = post_json(
        app,
        &format!("{LEGACY_PREFIX}/verify-token"),
        json!({ "token": token }),
    )
    .await?;
    let body: VerifyTokenResponse = read_json(response).await?;
    assert!(body.valid);
    Ok(())
}

#[tokio::test]
async fn bare_options_returns_empty_ok() -> Result<()> {
    for uri in ["/login", "/verify-token", "/.netlify/functions/login"] {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri(uri)
            .body(Body::empty())?;
        let response = test_app(Duration::ZERO)?.oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        assert!(bytes.is_empty());
    }
    Ok(())
}

#[tokio::test]
async fn cors_preflight_is_permissive() -> Result<()> {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/login")
        .header(header::ORIGIN, "https://memories.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())?;
    let response = test_app(Duration::ZERO)?.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
    Ok(())
}

#[tokio::test]
async fn cors_headers_on_responses() -> Result<()> {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/verify-token")
        .header(header::ORIGIN, "https://memories.example")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"token":"x.y.z"}"#))?;
    let response = test_app(Duration::ZERO)?.oneshot(request).await?;
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
    assert!(response.headers().contains_key("x-request-id"));
    Ok(())
}

#[tokio::test]
async fn wrong_method_is_rejected() -> Result<()> {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/login")
        .body(Body::empty())?;
    let response = test_app(Duration::ZERO)?.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}

#[tokio::test]
async fn health_reports_name_and_version() -> Result<()> {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .body(Body::empty())?;
    let response = test_app(Duration::ZERO)?.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("X-App"));

    let body: Value = read_json(response).await?;
    assert_eq!(body["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    Ok(())
}

#[test]
fn allowed_origin_must_be_a_url() {
    let issuer = TokenIssuer::new(alice_table(), signing_key());
    let state = Arc::new(AuthState::new(issuer, TokenVerifier::new(signing_key())));
    assert!(app(state.clone(), "not a url").is_err());
    assert!(app(state, "https://memories.example:8443/path").is_ok());
}
