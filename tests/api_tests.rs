use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use watcharr::config::Config;

/// Default API key seeded by migration (must match m20260710_initial.rs)
const DEFAULT_API_KEY: &str = "watcharr_default_api_key_please_regenerate";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A pooled in-memory SQLite gives every connection its own database, so
    // the pool has to stay at a single connection.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.server.secure_cookies = false;

    let state = watcharr::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    watcharr::api::router(state).await
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("X-Api-Key", DEFAULT_API_KEY)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, payload: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("X-Api-Key", DEFAULT_API_KEY)
        .header("Content-Type", mime::APPLICATION_JSON.as_ref())
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("X-Api-Key", DEFAULT_API_KEY)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_auth_endpoints() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/watched")
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
                .uri("/api/watched")
                .header("X-Api-Key", "wrong-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.clone().oneshot(get("/api/watched")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_and_session() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", mime::APPLICATION_JSON.as_ref())
                .body(Body::from(
                    serde_json::json!({
                        "username": "admin",
                        "password": "invalid-password"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", mime::APPLICATION_JSON.as_ref())
                .body(Body::from(
                    serde_json::json!({
                        "username": "admin",
                        "password": "password"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let session_cookie = response
        .headers()
        .get("set-cookie")
        .expect("login should set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "admin");
    assert_eq!(json["data"]["api_key"], DEFAULT_API_KEY);

    // The session cookie alone must authenticate protected routes.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header("Cookie", session_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "admin");
}

#[tokio::test]
async fn test_watched_crud() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/watched",
            &serde_json::json!({
                "tmdbId": 603,
                "type": "movie",
                "title": "The Matrix",
                "posterPath": "/matrix.jpg",
                "rating": 9
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["tmdbId"], 603);
    assert_eq!(json["data"]["title"], "The Matrix");
    assert!(
        json["data"]["watchedAt"].is_string(),
        "watchedAt should default to now"
    );
    let item_id = json["data"]["id"].as_i64().expect("saved item id");

    // Saving the same title again updates in place instead of duplicating.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/watched",
            &serde_json::json!({
                "tmdbId": 603,
                "type": "movie",
                "title": "The Matrix",
                "rating": 10
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/api/watched")).await.unwrap();
    let json = body_json(response).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["rating"], 10);

    let response = app
        .clone()
        .oneshot(delete(&format!("/api/watched/{item_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(delete(&format!("/api/watched/{item_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_watched_validation() {
    let app = spawn_app().await;

    // Missing title.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/watched",
            &serde_json::json!({ "tmdbId": 603, "type": "movie" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown media type.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/watched",
            &serde_json::json!({ "tmdbId": 603, "type": "book", "title": "X" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_watchlist_moves_to_watched() {
    let app = spawn_app().await;

    let item = serde_json::json!({
        "tmdbId": 1396,
        "type": "tv",
        "title": "Breaking Bad"
    });

    let response = app
        .clone()
        .oneshot(post_json("/api/watchlist", &item))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/api/watchlist")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    // Logging the title as watched clears it from the watchlist.
    let response = app
        .clone()
        .oneshot(post_json("/api/watched", &item))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/api/watchlist")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);

    // And it can no longer be put back on the watchlist.
    let response = app
        .clone()
        .oneshot(post_json("/api/watchlist", &item))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_watchlist_remove() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/watchlist",
            &serde_json::json!({ "tmdbId": 272, "type": "movie", "title": "Batman Begins" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(delete("/api/watchlist?tmdbId=272&type=movie"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(delete("/api/watchlist?tmdbId=272&type=movie"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_favorites_slots() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/profile-favorites",
            &serde_json::json!({
                "type": "movie",
                "position": 2,
                "tmdbId": 603,
                "title": "The Matrix"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/api/profile-favorites")).await.unwrap();
    let json = body_json(response).await;

    let movies = json["data"]["movies"].as_array().unwrap();
    assert_eq!(movies.len(), 4);
    assert!(movies[0].is_null());
    assert_eq!(movies[1]["tmdbId"], 603);
    assert!(movies[2].is_null());

    let tv = json["data"]["tv"].as_array().unwrap();
    assert_eq!(tv.len(), 4);
    assert!(tv.iter().all(serde_json::Value::is_null));

    // Slots are 1-4; anything else is rejected.
    for position in [0, 5] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/profile-favorites",
                &serde_json::json!({
                    "type": "movie",
                    "position": position,
                    "tmdbId": 603,
                    "title": "The Matrix"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/profile-favorites",
            &serde_json::json!({
                "type": "book",
                "position": 1,
                "tmdbId": 603,
                "title": "The Matrix"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(delete("/api/profile-favorites?type=movie&position=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(delete("/api/profile-favorites?type=movie&position=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_validation() {
    let app = spawn_app().await;

    // Blank query short-circuits to an empty result set.
    let response = app.clone().oneshot(get("/api/search")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);

    let response = app
        .clone()
        .oneshot(get("/api/popular?type=bogus"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(get("/api/content/bogus/603"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Movies have no episode run to finish.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/content/movie/603/complete",
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_change_password() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/auth/password")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .header("Content-Type", mime::APPLICATION_JSON.as_ref())
                .body(Body::from(
                    serde_json::json!({
                        "current_password": "password",
                        "new_password": "short"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/auth/password")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .header("Content-Type", mime::APPLICATION_JSON.as_ref())
                .body(Body::from(
                    serde_json::json!({
                        "current_password": "wrong-password",
                        "new_password": "a-much-better-one"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/auth/password")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .header("Content-Type", mime::APPLICATION_JSON.as_ref())
                .body(Body::from(
                    serde_json::json!({
                        "current_password": "password",
                        "new_password": "a-much-better-one"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The new password is live immediately.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", mime::APPLICATION_JSON.as_ref())
                .body(Body::from(
                    serde_json::json!({
                        "username": "admin",
                        "password": "a-much-better-one"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
