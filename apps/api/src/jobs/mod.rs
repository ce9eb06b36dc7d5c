//! Job registry: create, list and select job postings for the session user.

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ledger;
use crate::models::candidate::CandidateRecord;
use crate::models::job::{Job, NewJob};
use crate::session::Session;
use crate::store::DocumentStore;

pub mod handlers;

pub const MISSING_JOB_FIELDS: &str = "Enter job title and description";

#[derive(Debug, Serialize)]
pub struct SelectedJob {
    pub job: Job,
    pub candidates: Vec<CandidateRecord>,
}

/// Persists a job owned by the session user, then re-fetches the session's
/// job list from the store. The list is never patched locally.
pub async fn create_job(
    store: &dyn DocumentStore,
    session: &Session,
    title: &str,
    description: &str,
) -> Result<Job, AppError> {
    if title.trim().is_empty() || description.trim().is_empty() {
        return Err(AppError::Validation(MISSING_JOB_FIELDS.to_string()));
    }

    let job = store
        .insert_job(NewJob {
            owner_id: session.user_id(),
            title: title.to_string(),
            description: description.to_string(),
        })
        .await?;
    info!(user_id = %session.user_id(), job_id = %job.id, "Job created");

    reload_jobs(store, session).await?;
    Ok(job)
}

/// All jobs owned by `user_id`, in no particular order.
pub async fn list_jobs(store: &dyn DocumentStore, user_id: Uuid) -> Result<Vec<Job>, AppError> {
    Ok(store.jobs_by_owner(user_id).await?)
}

pub async fn reload_jobs(store: &dyn DocumentStore, session: &Session) -> Result<Vec<Job>, AppError> {
    let jobs = list_jobs(store, session.user_id()).await?;
    session.replace_jobs(jobs.clone()).await;
    Ok(jobs)
}

/// Makes `job_id` the active job and loads its ledger.
pub async fn select_job(
    store: &dyn DocumentStore,
    session: &Session,
    job_id: Uuid,
) -> Result<SelectedJob, AppError> {
    let job = session
        .jobs()
        .await
        .into_iter()
        .find(|j| j.id == job_id)
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    session.select(job.clone()).await;
    let candidates = ledger::refresh(store, session, job.id).await?;

    Ok(SelectedJob { job, candidates })
}
