//! Candidate ledger: the reviewable list of scored candidates for a job.
//!
//! The store is the source of truth. Every mutation is written to the store
//! first and the view is then reloaded from a fresh query; `clear` is the one
//! exception, emptying the view locally once every delete has succeeded.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::batch::BatchReport;
use crate::errors::AppError;
use crate::models::candidate::{CandidateRecord, Tag};
use crate::session::Session;
use crate::store::DocumentStore;

pub mod cache;
pub mod handlers;

pub const NO_JOB_SELECTED: &str = "Select a job first!";

/// Reloads the ledger for `job_id` from the store and returns the resulting view.
///
/// On a store failure the cached view is left untouched. If a newer refresh
/// for the same job has already been applied, this result is discarded and
/// the newer view is returned.
pub async fn refresh(
    store: &dyn DocumentStore,
    session: &Session,
    job_id: Uuid,
) -> Result<Vec<CandidateRecord>, AppError> {
    let ticket = session.ledger.lock().await.issue(job_id);

    let records = store
        .candidates_for_job(session.user_id(), job_id)
        .await
        .map_err(|e| {
            warn!(user_id = %session.user_id(), job_id = %job_id, "Ledger refresh failed: {e}");
            AppError::from(e)
        })?;

    let mut ledger = session.ledger.lock().await;
    if !ledger.apply(ticket, records) {
        debug!(job_id = %job_id, "Discarded stale ledger refresh");
    }
    Ok(ledger.records(job_id).to_vec())
}

/// The cached view for `job_id` without touching the store.
pub async fn view(session: &Session, job_id: Uuid) -> Vec<CandidateRecord> {
    session.ledger.lock().await.records(job_id).to_vec()
}

/// Records a reviewer decision on one candidate of the selected job and
/// returns the reloaded view. `Unreviewed` cannot be assigned.
pub async fn set_tag(
    store: &dyn DocumentStore,
    session: &Session,
    record_id: Uuid,
    tag: Tag,
) -> Result<Vec<CandidateRecord>, AppError> {
    if !tag.is_review_decision() {
        return Err(AppError::Validation(format!(
            "Tag must be one of Shortlisted, Maybe or Rejected, got {tag}"
        )));
    }
    let job = session
        .selected_job()
        .await
        .ok_or_else(|| AppError::Validation(NO_JOB_SELECTED.to_string()))?;

    store.update_tag(session.user_id(), record_id, tag).await?;
    info!(user_id = %session.user_id(), record_id = %record_id, %tag, "Candidate tagged");

    refresh(store, session, job.id).await
}

/// Deletes every candidate record of `job_id` one by one.
///
/// When all deletes succeed the view is emptied without a re-fetch. When
/// some fail, the survivors are still in the store, so the view is reloaded
/// to show them. A failed reload is noted on the report, never raised.
pub async fn clear(
    store: &dyn DocumentStore,
    session: &Session,
    job_id: Uuid,
) -> Result<BatchReport, AppError> {
    let records = store.candidates_for_job(session.user_id(), job_id).await?;

    let mut report = BatchReport::default();
    for record in records {
        match store.delete_candidate(session.user_id(), record.id).await {
            Ok(()) => report.record_success(record.id),
            Err(e) => {
                warn!(record_id = %record.id, "Failed to delete candidate record: {e}");
                report.record_failure(record.id.to_string(), e);
            }
        }
    }

    if report.is_complete() {
        session.ledger.lock().await.clear(job_id);
        info!(job_id = %job_id, deleted = report.succeeded.len(), "Ledger cleared");
    } else {
        warn!(
            job_id = %job_id,
            failed = report.failures.len(),
            "Ledger clear partially failed; reloading survivors"
        );
        if let Err(e) = refresh(store, session, job_id).await {
            report.record_refresh_failure(&e);
        }
    }

    Ok(report)
}
