//! groupwise-server - affinity grouping as a JSON-over-HTTP service
//!
//! Endpoints:
//! - `GET /health`
//! - `POST /api/groups`
//!
//! Bind address resolution: `--bind` > `GROUPWISE_BIND` > config file > default.

use anyhow::{Context, Result};
use clap::Parser;
use groupwise_common::config::load_config;
use groupwise_server::{build_router, AppState};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

#[derive(Parser, Debug)]
#[clap(name = "groupwise-server", version)]
#[clap(about = "Serve affinity grouping over HTTP")]
struct Args {
    /// Configuration file (TOML)
    #[clap(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listen address (host:port)
    #[clap(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber; the configured level replaces the
    // startup filter once config is loaded, unless RUST_LOG is set
    let env_filter = EnvFilter::try_from_default_env().ok();
    let follows_config = env_filter.is_none();
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    // Build identification immediately after tracing init
    info!(
        "Starting groupwise-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let mut config =
        load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if follows_config {
        filter_handle.reload(EnvFilter::new(&config.logging.level))?;
    }
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    info!(
        "Defaults: group size {}, balance weight {}",
        config.grouping.group_size, config.grouping.balance_weight
    );

    let state = AppState::new(config.grouping.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!("groupwise-server listening on http://{}", config.server.bind);
    info!("Health check: http://{}/health", config.server.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
