use std::sync::Arc;

use crate::config::Config;
use crate::identity::IdentityProvider;
use crate::scoring_client::ScoringClient;
use crate::session::SessionRegistry;
use crate::store::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres in production, in-memory when no DATABASE_URL is set.
    pub store: Arc<dyn DocumentStore>,
    pub scorer: Arc<dyn ScoringClient>,
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: Arc<SessionRegistry>,
    pub config: Config,
}
