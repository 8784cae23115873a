//! Origin-country backfill command handler

use crate::clients::tmdb::TmdbClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::backfill;
use crate::state::build_shared_http_client;

pub async fn cmd_backfill(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    let http_client = build_shared_http_client(config.tmdb.request_timeout_seconds.into())?;
    let tmdb = TmdbClient::with_shared_client(http_client, &config.tmdb);

    if !tmdb.has_api_key() {
        println!("No TMDB API key configured. Set [tmdb] api_key or TMDB_API_KEY first.");
        return Ok(());
    }

    println!("Checking watched items for missing origin countries...");

    let report = backfill::run(&store, &tmdb).await?;

    println!("{}", report.message);
    for error in &report.errors {
        println!("  ! {error}");
    }

    Ok(())
}
