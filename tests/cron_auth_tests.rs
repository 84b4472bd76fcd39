mod common;

use axum_test::TestServer;
use common::create_test_app;
use http::{header, HeaderValue, StatusCode};
use serial_test::serial;

const CRON_ENDPOINTS: &[&str] = &[
    "/api/cron/check-thresholds",
    "/api/cron/sync-revenues",
    "/api/cron/monthly-sync",
    "/api/cron/reconcile-trials",
    "/api/cron/monthly-reminder",
];

#[tokio::test]
#[serial]
async fn health_is_public() {
    let server = TestServer::new(create_test_app()).unwrap();

    let response = server.get("/health").await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "microcompta");
}

#[tokio::test]
#[serial]
async fn missing_secret_is_rejected_with_french_error() {
    let server = TestServer::new(create_test_app()).unwrap();

    for endpoint in CRON_ENDPOINTS {
        let response = server.post(endpoint).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Non autorisé", "endpoint {}", endpoint);
    }
}

#[tokio::test]
#[serial]
async fn wrong_bearer_secret_is_rejected() {
    let server = TestServer::new(create_test_app()).unwrap();

    for endpoint in CRON_ENDPOINTS {
        let response = server
            .post(endpoint)
            .add_header(
                header::AUTHORIZATION,
                HeaderValue::from_static("Bearer not-the-secret"),
            )
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Non autorisé", "endpoint {}", endpoint);
    }
}

#[tokio::test]
#[serial]
async fn wrong_query_secret_is_rejected() {
    let server = TestServer::new(create_test_app()).unwrap();

    let response = server
        .post("/api/cron/sync-revenues")
        .add_query_param("secret", "guessing")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Non autorisé");
}

#[tokio::test]
#[serial]
async fn garbage_jwt_is_rejected_on_threshold_check() {
    let server = TestServer::new(create_test_app()).unwrap();

    let response = server
        .post("/api/cron/check-thresholds")
        .add_header(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer eyJhbGciOiJIUzI1NiJ9.not.a-token"),
        )
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Non autorisé");
}

#[tokio::test]
#[serial]
async fn get_proxy_variants_require_the_secret_too() {
    let server = TestServer::new(create_test_app()).unwrap();

    for endpoint in [
        "/api/cron/check-thresholds",
        "/api/cron/sync-revenues",
        "/api/cron/monthly-sync",
        "/api/cron/monthly-reminder",
    ] {
        let response = server.get(endpoint).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}
