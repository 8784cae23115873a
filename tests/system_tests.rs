//! Integration tests for system API endpoints.
//!
//! Covers the health probes and the status summary.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use watcharr::config::Config;

async fn spawn_app() -> (Router, String) {
    let db_path =
        std::env::temp_dir().join(format!("watcharr-system-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());

    let state = watcharr::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");

    let api_key = state
        .store()
        .get_user_api_key("admin")
        .await
        .expect("Failed to fetch bootstrap API key")
        .expect("Bootstrap admin user missing API key");

    (watcharr::api::router(state).await, api_key)
}

#[tokio::test]
async fn test_health_live() {
    let (app, _) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/system/health/live")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert!(body_json["success"].as_bool().unwrap_or(false));
    assert_eq!(body_json["data"]["status"], "alive");
}

#[tokio::test]
async fn test_health_ready() {
    let (app, _) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/system/health/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert!(body_json["success"].as_bool().unwrap_or(false));
    assert_eq!(body_json["data"]["ready"], true);
    assert_eq!(body_json["data"]["checks"]["database"], true);
}

#[tokio::test]
async fn test_get_status() {
    let (app, api_key) = spawn_app().await;

    // Unauthenticated requests are rejected.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/system/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/system/status")
                .header("X-Api-Key", api_key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert!(body_json["success"].as_bool().unwrap());
    assert!(body_json["data"].is_object());

    let data = body_json["data"].as_object().unwrap();
    assert!(data.get("version").is_some());
    assert!(data.get("uptime").is_some());
    assert_eq!(data["watchedCount"], 0);
    assert_eq!(data["watchlistCount"], 0);
    assert_eq!(data["userCount"], 1);
    assert_eq!(data["database"], true);
}
