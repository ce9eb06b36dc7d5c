pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};

use crate::identity::handlers as auth;
use crate::jobs::handlers as jobs;
use crate::ledger::handlers as ledger;
use crate::matching::handlers as matching;
use crate::reporting::handlers as reporting;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Identity
        .route("/api/v1/auth/sign-up", post(auth::handle_sign_up))
        .route("/api/v1/auth/sign-in", post(auth::handle_sign_in))
        .route("/api/v1/auth/sign-out", post(auth::handle_sign_out))
        .route("/api/v1/session", get(auth::handle_get_session))
        // Job registry
        .route(
            "/api/v1/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route("/api/v1/session/job", put(jobs::handle_select_job))
        // Match submission
        .route(
            "/api/v1/match",
            post(matching::handle_submit_match).layer(upload_limit),
        )
        // Candidate ledger
        .route(
            "/api/v1/ledger",
            get(ledger::handle_get_ledger).delete(ledger::handle_clear_ledger),
        )
        .route("/api/v1/ledger/:id/tag", patch(ledger::handle_set_tag))
        // Reporting
        .route("/api/v1/ledger/summary", get(reporting::handle_summary))
        .route("/api/v1/ledger/export", get(reporting::handle_export))
        .route("/api/v1/ledger/:id/mailto", get(reporting::handle_mailto))
        .with_state(state)
}
