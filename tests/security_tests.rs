//! Security-focused integration tests.
//!
//! Tests SQL injection prevention, request limits, CORS, and hostile path
//! parameters at the API level.
//!
//! Requires TEST_DATABASE_URL to be set.
//! Run with: cargo test --test security_tests -- --test-threads=1

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

macro_rules! require_db {
    () => {
        if !common::has_test_db() {
            eprintln!("Skipping: TEST_DATABASE_URL not set");
            return;
        }
    };
}

async fn app() -> Router {
    common::build_test_app().await
}

async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::json!(null));
    (status, json)
}

async fn post_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .uri(uri)
                .method(Method::POST)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap_or(serde_json::json!(null));
    (status, json)
}

// ---------------------------------------------------------------------------
// SQL injection tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sql_injection_in_name_fields_stored_verbatim() {
    require_db!();
    let router = app().await;
    let injections = [
        "'; DROP TABLE users; --",
        "Robert'); DELETE FROM users; --",
        "' OR '1'='1",
        "\\'; UPDATE users SET email='hacked'; --",
    ];

    for (i, injection) in injections.iter().enumerate() {
        let vk_id = 7000 + i as i64;
        let (status, json) = post_json(
            router.clone(),
            "/api/auth/vk",
            serde_json::json!({"id": vk_id, "first_name": injection, "last_name": "X"}),
        )
        .await;
        // Parameterized binds: the hostile string is just data
        assert_eq!(
            status,
            StatusCode::OK,
            "Injection attempt should not crash: {}",
            injection
        );
        assert_eq!(json["data"]["first_name"], *injection);

        let (status, fetched) = get(router.clone(), &format!("/api/users/{vk_id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["data"]["first_name"], *injection);
    }

    // The users table survived every attempt
    let db = common::connect_db().await;
    assert_eq!(db.count_users().await.unwrap(), injections.len() as i64);
}

#[tokio::test]
async fn sql_injection_in_address_text_stored_verbatim() {
    require_db!();
    let router = app().await;
    let (_, login) = post_json(
        router.clone(),
        "/api/auth/vk",
        serde_json::json!({"id": 7100, "first_name": "A", "last_name": "B"}),
    )
    .await;
    let user_id = login["data"]["id"].as_i64().unwrap();

    let hostile = "Nevsky 1'; DROP TABLE addresses; --";
    let (status, created) = post_json(
        router.clone(),
        "/api/addresses",
        serde_json::json!({"user_id": user_id, "title": "Home", "address_text": hostile}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["data"]["address_text"], hostile);

    let (status, list) = get(router, &format!("/api/users/{user_id}/addresses")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["data"][0]["address_text"], hostile);
}

// ---------------------------------------------------------------------------
// Body size limit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn body_size_limit_enforced() {
    require_db!();
    let router = app().await;

    // 2MB payload exceeds the 1MB limit
    let large_body = "x".repeat(2 * 1024 * 1024);
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/users/save")
                .method(Method::POST)
                .header("content-type", "application/json")
                .body(Body::from(large_body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// ---------------------------------------------------------------------------
// CORS
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_returns_correct_headers() {
    require_db!();
    let router = app().await;

    // Send a CORS preflight request (OPTIONS)
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/users/1")
                .method(Method::OPTIONS)
                .header("origin", "https://evil.example.com")
                .header("access-control-request-method", "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Should have CORS headers
    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_some(),
        "Missing access-control-allow-origin header"
    );
    assert!(
        response
            .headers()
            .get("access-control-allow-methods")
            .is_some(),
        "Missing access-control-allow-methods header"
    );
}

#[tokio::test]
async fn cors_get_includes_allow_origin() {
    require_db!();
    let router = app().await;

    let response = router
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .header("origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_some());
}

// ---------------------------------------------------------------------------
// Hostile path parameters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn path_traversal_in_user_id_rejected() {
    require_db!();
    let traversal_attempts = [
        "/api/users/../../../etc/passwd",
        "/api/users/..%2F..%2Fetc%2Fpasswd",
        "/api/users/..%5C..%5Cwindows",
    ];

    for path in &traversal_attempts {
        let (status, _) = get(app().await, path).await;
        assert!(
            status == StatusCode::BAD_REQUEST || status == StatusCode::NOT_FOUND,
            "Path traversal should be rejected: {} (got {})",
            path,
            status
        );
    }
}

#[tokio::test]
async fn overflowing_numeric_id_rejected() {
    require_db!();
    // Larger than i64::MAX; must be a clean 400, not a 500
    let (status, _) = get(app().await, "/api/users/99999999999999999999").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Request validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn address_for_negative_user_id_rejected() {
    require_db!();
    let (status, json) = post_json(
        app().await,
        "/api/addresses",
        serde_json::json!({"user_id": -1, "title": "Home", "address_text": "Nevsky 1"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Unknown user_id");
}

#[tokio::test]
async fn malformed_json_returns_error() {
    require_db!();
    let router = app().await;

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/auth/vk")
                .method(Method::POST)
                .header("content-type", "application/json")
                .body(Body::from("{invalid json}"))
                .unwrap(),
        )
        .await
        .unwrap();
    // Should return 4xx (400 or 422)
    assert!(
        response.status().is_client_error(),
        "Malformed JSON should return client error, got {}",
        response.status()
    );
}
