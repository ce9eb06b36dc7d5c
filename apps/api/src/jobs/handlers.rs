use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::{ApiJson, AppError};
use crate::jobs::{create_job, reload_jobs, select_job, SelectedJob};
use crate::models::job::Job;
use crate::session::CurrentSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectJobRequest {
    pub job_id: Uuid,
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<Job>>, AppError> {
    Ok(Json(reload_jobs(state.store.as_ref(), &session).await?))
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    ApiJson(req): ApiJson<CreateJobRequest>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let job = create_job(state.store.as_ref(), &session, &req.title, &req.description).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// PUT /api/v1/session/job
pub async fn handle_select_job(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    ApiJson(req): ApiJson<SelectJobRequest>,
) -> Result<Json<SelectedJob>, AppError> {
    Ok(Json(select_job(state.store.as_ref(), &session, req.job_id).await?))
}
