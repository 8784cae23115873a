use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clients::tmdb::TmdbClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    CatalogService, SeaOrmWatchService, TmdbCatalogService, WatchService,
};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// This client should be reused across all HTTP-based services to enable
/// connection pooling and avoid socket exhaustion.
pub(crate) fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Watcharr/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub tmdb: Arc<TmdbClient>,

    pub watch_service: Arc<dyn WatchService>,

    pub catalog_service: Arc<dyn CatalogService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client =
            build_shared_http_client(config.tmdb.request_timeout_seconds.into())?;
        let tmdb = Arc::new(TmdbClient::with_shared_client(http_client, &config.tmdb));

        let store_arc = Arc::new(store.clone());
        let watch_service = Arc::new(SeaOrmWatchService::new(store_arc.clone()))
            as Arc<dyn WatchService + Send + Sync + 'static>;
        let catalog_service = Arc::new(TmdbCatalogService::new(
            tmdb.clone(),
            store_arc,
            config.cache.clone(),
        )) as Arc<dyn CatalogService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            tmdb,
            watch_service,
            catalog_service,
        })
    }
}
