use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::batch::BatchReport;
use crate::errors::{ApiJson, AppError};
use crate::ledger::{clear, refresh, set_tag, NO_JOB_SELECTED};
use crate::models::candidate::{CandidateRecord, Tag};
use crate::models::job::Job;
use crate::session::{CurrentSession, Session};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetTagRequest {
    pub tag: Tag,
}

pub(crate) async fn require_selected_job(session: &Session) -> Result<Job, AppError> {
    session
        .selected_job()
        .await
        .ok_or_else(|| AppError::Validation(NO_JOB_SELECTED.to_string()))
}

/// GET /api/v1/ledger
pub async fn handle_get_ledger(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<CandidateRecord>>, AppError> {
    let job = require_selected_job(&session).await?;
    Ok(Json(refresh(state.store.as_ref(), &session, job.id).await?))
}

/// PATCH /api/v1/ledger/:id/tag
pub async fn handle_set_tag(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(record_id): Path<Uuid>,
    ApiJson(req): ApiJson<SetTagRequest>,
) -> Result<Json<Vec<CandidateRecord>>, AppError> {
    Ok(Json(
        set_tag(state.store.as_ref(), &session, record_id, req.tag).await?,
    ))
}

/// DELETE /api/v1/ledger
pub async fn handle_clear_ledger(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<(StatusCode, Json<BatchReport>), AppError> {
    let job = require_selected_job(&session).await?;
    let report = clear(state.store.as_ref(), &session, job.id).await?;
    let status = if report.is_clean() {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((status, Json(report)))
}
