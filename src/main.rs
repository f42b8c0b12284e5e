//! cuedeck - Live Set Sequencing Assistant
//!
//! Tracks the in-progress set per user and recommends harmonically and
//! rhythmically mixable next tracks, anchored on the most recently
//! committed one. Candidate metadata comes from the Spotify Web API;
//! catalog outages degrade to empty suggestion pools, never to failed
//! requests.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use cuedeck::config::Config;
use cuedeck::services::{Recommender, SpotifyCatalog};
use cuedeck::store::MemorySessionStore;
use cuedeck::AppState;

#[derive(Debug, Parser)]
#[command(name = "cuedeck", version, about = "Live set sequencing assistant")]
struct Args {
    /// Path to TOML config file
    #[arg(long, env = "CUEDECK_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address override, e.g. 127.0.0.1:5727
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Starting cuedeck v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }

    if config.spotify.client_id.is_none() || config.spotify.client_secret.is_none() {
        warn!("running without Spotify credentials; suggestions will be empty");
    }

    let catalog = Arc::new(
        SpotifyCatalog::new(config.spotify.clone())
            .map_err(|e| anyhow::anyhow!("failed to create catalog client: {}", e))?,
    );
    let store = Arc::new(MemorySessionStore::new());
    let recommender = Arc::new(Recommender::new(store, catalog, config.recommender.clone()));

    let state = AppState::new(recommender);
    let app = cuedeck::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("cuedeck listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
