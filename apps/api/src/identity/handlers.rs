//! Axum route handlers for sign-up, sign-in, sign-out and the session snapshot.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ApiJson, AppError};
use crate::jobs::reload_jobs;
use crate::models::job::Job;
use crate::models::user::Identity;
use crate::session::{CurrentSession, Session};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: Uuid,
    pub identity: Identity,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub identity: Identity,
    pub jobs: Vec<Job>,
    pub selected_job: Option<Job>,
    pub busy: bool,
}

/// Opens a session for a freshly authenticated identity and loads its jobs.
async fn start_session(state: &AppState, identity: Identity) -> Result<AuthResponse, AppError> {
    let session: Arc<Session> = state.sessions.open(identity).await;
    let jobs = match reload_jobs(state.store.as_ref(), &session).await {
        Ok(jobs) => jobs,
        Err(e) => {
            state.sessions.close(session.token).await;
            return Err(e);
        }
    };
    Ok(AuthResponse {
        token: session.token,
        identity: session.identity.clone(),
        jobs,
    })
}

/// POST /api/v1/auth/sign-up
pub async fn handle_sign_up(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignUpRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let identity = state
        .identity
        .sign_up(&req.email, &req.password, &req.display_name)
        .await?;
    let response = start_session(&state, identity).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/sign-in
pub async fn handle_sign_in(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignInRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let identity = state.identity.sign_in(&req.email, &req.password).await?;
    Ok(Json(start_session(&state, identity).await?))
}

/// POST /api/v1/auth/sign-out
pub async fn handle_sign_out(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> StatusCode {
    state.sessions.close(session.token).await;
    state.identity.sign_out(session.user_id()).await;
    StatusCode::NO_CONTENT
}

/// GET /api/v1/session
pub async fn handle_get_session(CurrentSession(session): CurrentSession) -> Json<SessionResponse> {
    Json(SessionResponse {
        identity: session.identity.clone(),
        jobs: session.jobs().await,
        selected_job: session.selected_job().await,
        busy: session.is_busy(),
    })
}
