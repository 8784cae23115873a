use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use time;

use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
mod backfill;
mod content;
mod error;
mod favorites;
mod observability;
mod person;
mod search;
mod system;
mod types;
mod watched;
mod watchlist;

pub use error::ApiError;
pub use types::*;

use tokio::sync::RwLock;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn tmdb(&self) -> &Arc<crate::clients::tmdb::TmdbClient> {
        &self.shared.tmdb
    }

    #[must_use]
    pub fn watch_service(&self) -> &Arc<dyn crate::services::WatchService> {
        &self.shared.watch_service
    }

    #[must_use]
    pub fn catalog_service(&self) -> &Arc<dyn crate::services::CatalogService> {
        &self.shared.catalog_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
        )
    };

    let protected_routes = create_protected_router(state.clone());

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(60)));

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/system/health/live", get(system::health_live))
        .route("/system/health/ready", get(system::health_ready))
        .layer(session_layer)
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/password", put(auth::change_password))
        .route("/auth/api-key/regenerate", post(auth::regenerate_api_key))
        .route("/watched", get(watched::list_watched))
        .route("/watched", post(watched::save_watched))
        .route("/watched/{id}", delete(watched::delete_watched))
        .route("/watchlist", get(watchlist::list_watchlist))
        .route("/watchlist", post(watchlist::add_to_watchlist))
        .route("/watchlist", delete(watchlist::remove_from_watchlist))
        .route("/profile-favorites", get(favorites::list_favorites))
        .route("/profile-favorites", post(favorites::set_favorite))
        .route("/profile-favorites", delete(favorites::clear_favorite))
        .route("/search", get(search::search_titles))
        .route("/popular", get(search::popular_titles))
        .route("/content/{type}/{id}", get(content::get_content))
        .route("/content/{type}/{id}/save", post(content::save_content))
        .route("/content/{type}/{id}/drop", post(content::drop_content))
        .route(
            "/content/{type}/{id}/restore",
            post(content::restore_content),
        )
        .route(
            "/content/{type}/{id}/complete",
            post(content::complete_content),
        )
        .route(
            "/content/{type}/{id}/favorite",
            post(content::favorite_content),
        )
        .route("/person/{id}", get(person::get_person))
        .route(
            "/backfill-origin-country",
            post(backfill::backfill_origin_country),
        )
        .route("/system/status", get(system::get_status))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
