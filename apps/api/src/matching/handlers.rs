use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use crate::errors::AppError;
use crate::matching::{submit_match, MatchOutcome};
use crate::scoring_client::ResumeFile;
use crate::session::CurrentSession;
use crate::state::AppState;

const RESUME_FIELD: &str = "resumes";

/// POST /api/v1/match
///
/// Multipart upload; every `resumes` part is one resume file. Responds 200
/// when every match was recorded and 207 when some records failed to write or
/// the ledger could not be reloaded afterwards.
pub async fn handle_submit_match(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MatchOutcome>), AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("resume.pdf").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid file '{filename}': {e}")))?;
        files.push(ResumeFile {
            filename,
            content_type,
            bytes,
        });
    }

    let outcome = submit_match(
        state.store.as_ref(),
        state.scorer.as_ref(),
        &session,
        files,
    )
    .await?;

    let status = if outcome.report.is_clean() {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((status, Json(outcome)))
}
