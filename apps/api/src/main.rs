mod batch;
mod config;
mod db;
mod errors;
mod identity;
mod jobs;
mod ledger;
mod matching;
mod models;
mod reporting;
mod routes;
mod scoring_client;
mod session;
mod state;
mod store;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::identity::{IdentityProvider, LocalIdentityProvider};
use crate::routes::build_router;
use crate::scoring_client::HttpScoringClient;
use crate::session::SessionRegistry;
use crate::state::AppState;
use crate::store::{DocumentStore, MemoryStore, PgDocumentStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Matcher API v{}", env!("CARGO_PKG_VERSION"));

    // Document store: Postgres when configured, otherwise process-local
    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => Arc::new(PgDocumentStore::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL not set; using in-memory store (data is lost on restart)");
            Arc::new(MemoryStore::new())
        }
    };

    // Remote scoring service
    let scorer = HttpScoringClient::new(
        &config.scoring_api_url,
        Duration::from_secs(config.scoring_timeout_secs),
    )?;
    info!("Scoring client initialized (endpoint: {})", scorer.endpoint());

    // Identity and sessions; sessions follow auth-state changes and expire when idle
    let identity = Arc::new(LocalIdentityProvider::new());
    let sessions = Arc::new(SessionRegistry::new());
    tokio::spawn(Arc::clone(&sessions).follow(identity.subscribe()));
    tokio::spawn(Arc::clone(&sessions).expire_idle(
        Duration::from_secs(config.session_idle_secs),
        Duration::from_secs(60),
    ));

    let state = AppState {
        store,
        scorer: Arc::new(scorer),
        identity,
        sessions,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
