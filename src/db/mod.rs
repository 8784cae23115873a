use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use serde_json::{Map, Value};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use crate::entities::profile_favorites::Model as ProfileFavorite;
pub use crate::entities::watched_items::Model as WatchedItem;
pub use crate::entities::watchlist_items::Model as WatchlistItem;
pub use repositories::favorites::FavoriteSlot;
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn watched_repo(&self) -> repositories::watched::WatchedRepository {
        repositories::watched::WatchedRepository::new(self.conn.clone())
    }

    fn watchlist_repo(&self) -> repositories::watchlist::WatchlistRepository {
        repositories::watchlist::WatchlistRepository::new(self.conn.clone())
    }

    fn favorites_repo(&self) -> repositories::favorites::FavoritesRepository {
        repositories::favorites::FavoritesRepository::new(self.conn.clone())
    }

    fn cache_repo(&self) -> repositories::cache::CacheRepository {
        repositories::cache::CacheRepository::new(self.conn.clone())
    }

    // ========== Watched Items ==========

    pub async fn list_watched(&self, user_id: &str) -> Result<Vec<WatchedItem>> {
        self.watched_repo().list_for_user(user_id).await
    }

    pub async fn find_watched(
        &self,
        user_id: &str,
        tmdb_id: i32,
        media_type: &str,
    ) -> Result<Option<WatchedItem>> {
        self.watched_repo()
            .find_by_key(user_id, tmdb_id, media_type)
            .await
    }

    pub async fn upsert_watched(
        &self,
        user_id: &str,
        row: &Map<String, Value>,
    ) -> Result<WatchedItem> {
        self.watched_repo().upsert(user_id, row).await
    }

    pub async fn delete_watched(&self, user_id: &str, id: i32) -> Result<bool> {
        self.watched_repo().delete(user_id, id).await
    }

    pub async fn count_watched(&self) -> Result<u64> {
        self.watched_repo().count().await
    }

    pub async fn list_watched_missing_origin_country(&self) -> Result<Vec<WatchedItem>> {
        self.watched_repo().list_missing_origin_country().await
    }

    pub async fn set_watched_origin_country(
        &self,
        id: i32,
        origin_country: Option<String>,
    ) -> Result<bool> {
        self.watched_repo()
            .set_origin_country(id, origin_country)
            .await
    }

    // ========== Watchlist ==========

    pub async fn list_watchlist(&self, user_id: &str) -> Result<Vec<WatchlistItem>> {
        self.watchlist_repo().list_for_user(user_id).await
    }

    pub async fn upsert_watchlist(
        &self,
        user_id: &str,
        row: &Map<String, Value>,
    ) -> Result<WatchlistItem> {
        self.watchlist_repo().upsert(user_id, row).await
    }

    pub async fn remove_from_watchlist(
        &self,
        user_id: &str,
        tmdb_id: i32,
        media_type: &str,
    ) -> Result<bool> {
        self.watchlist_repo()
            .remove(user_id, tmdb_id, media_type)
            .await
    }

    pub async fn count_watchlist(&self) -> Result<u64> {
        self.watchlist_repo().count().await
    }

    // ========== Profile Favorites ==========

    pub async fn list_profile_favorites(&self, user_id: &str) -> Result<Vec<ProfileFavorite>> {
        self.favorites_repo().list_for_user(user_id).await
    }

    pub async fn set_profile_favorite(
        &self,
        user_id: &str,
        slot: &FavoriteSlot,
    ) -> Result<ProfileFavorite> {
        self.favorites_repo().set_slot(user_id, slot).await
    }

    pub async fn clear_profile_favorite(
        &self,
        user_id: &str,
        media_type: &str,
        position: i32,
    ) -> Result<bool> {
        self.favorites_repo()
            .clear_slot(user_id, media_type, position)
            .await
    }

    // ========== Response Cache ==========

    pub async fn get_cached_response(&self, cache_key: &str) -> Result<Option<Value>> {
        self.cache_repo().get(cache_key).await
    }

    pub async fn cache_response(
        &self,
        cache_key: &str,
        body: &Value,
        ttl_seconds: u64,
    ) -> Result<()> {
        self.cache_repo().put(cache_key, body, ttl_seconds).await
    }

    // ========== User Repository Methods ==========

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        config: Option<&crate::config::SecurityConfig>,
    ) -> Result<User> {
        self.user_repo().create(username, password, config).await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn update_user_password(
        &self,
        username: &str,
        new_password: &str,
        config: Option<&crate::config::SecurityConfig>,
    ) -> Result<()> {
        self.user_repo()
            .update_password(username, new_password, config)
            .await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn get_user_api_key(&self, username: &str) -> Result<Option<String>> {
        self.user_repo().get_api_key(username).await
    }

    pub async fn regenerate_user_api_key(&self, username: &str) -> Result<String> {
        self.user_repo().regenerate_api_key(username).await
    }
}
