pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod domain;
pub mod entities;
pub mod services;
pub mod state;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ConfigCommands, UserCommands};
pub use config::Config;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let mut log_level = config.general.log_level.clone();
    if config.general.suppress_connection_errors {
        log_level.push_str(",reqwest::retry=off,hyper_util=off");
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let mut builder = tracing_loki::builder();
        for (name, value) in &config.observability.loki_labels {
            builder = builder.label(name, value)?;
        }

        let (layer, task) = builder.extra_field("env", "production")?.build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    if config.tmdb.api_key.is_empty() {
        warn!("No TMDB API key configured; set [tmdb] api_key or TMDB_API_KEY before using catalog features");
    }

    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Serve) => run_server(config, prometheus_handle).await,

        Some(Commands::User { command }) => match command {
            UserCommands::Add { username } => cli::cmd_user_add(&config, &username).await,
            UserCommands::Passwd { username } => cli::cmd_user_passwd(&config, &username).await,
            UserCommands::ApiKey {
                username,
                regenerate,
            } => cli::cmd_user_api_key(&config, &username, regenerate).await,
        },

        Some(Commands::Backfill) => cli::cmd_backfill(&config).await,

        Some(Commands::Config { command }) => match command {
            ConfigCommands::Init => cli::cmd_config_init(),
            ConfigCommands::Show => cli::cmd_config_show(&config),
        },
    }
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("Watcharr v{} starting...", env!("CARGO_PKG_VERSION"));

    if !config.server.enabled {
        warn!("Server is disabled in config ([server] enabled = false), nothing to do");
        return Ok(());
    }

    let port = config.server.port;
    let state = api::create_app_state_from_config(config, prometheus_handle).await?;

    let app = api::router(state).await;
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_handle = tokio::spawn(async move {
        info!("🌐 Web Server running at http://0.0.0.0:{}", port);
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    info!("Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    server_handle.abort();
    info!("Server stopped");

    Ok(())
}
