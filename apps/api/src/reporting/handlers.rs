//! Read-only endpoints over the session's cached ledger view. None of these
//! query the store; call GET /api/v1/ledger first to reload.

use axum::{
    extract::Path,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ledger::{handlers::require_selected_job, view};
use crate::reporting::{
    compute_score_series, compute_tag_summary, export_shortlisted, interview_mailto, ScorePoint,
    TagCount, EXPORT_FILENAME,
};
use crate::session::CurrentSession;

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub tag_summary: Vec<TagCount>,
    pub score_series: Vec<ScorePoint>,
}

#[derive(Debug, Serialize)]
pub struct MailtoResponse {
    pub mailto: String,
}

/// GET /api/v1/ledger/summary
pub async fn handle_summary(
    CurrentSession(session): CurrentSession,
) -> Result<Json<SummaryResponse>, AppError> {
    let job = require_selected_job(&session).await?;
    let records = view(&session, job.id).await;
    Ok(Json(SummaryResponse {
        tag_summary: compute_tag_summary(&records),
        score_series: compute_score_series(&records),
    }))
}

/// GET /api/v1/ledger/export
pub async fn handle_export(CurrentSession(session): CurrentSession) -> Result<Response, AppError> {
    let job = require_selected_job(&session).await?;
    let csv = export_shortlisted(&view(&session, job.id).await);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        csv,
    )
        .into_response())
}

/// GET /api/v1/ledger/:id/mailto
pub async fn handle_mailto(
    CurrentSession(session): CurrentSession,
    Path(record_id): Path<Uuid>,
) -> Result<Json<MailtoResponse>, AppError> {
    let job = require_selected_job(&session).await?;
    let record = view(&session, job.id)
        .await
        .into_iter()
        .find(|r| r.id == record_id)
        .ok_or_else(|| AppError::NotFound(format!("Candidate {record_id} not found")))?;

    let mailto = interview_mailto(&record).ok_or_else(|| {
        AppError::Validation("Interview emails are only offered for shortlisted candidates".into())
    })?;
    Ok(Json(MailtoResponse { mailto }))
}
