//! Client for the remote resume scoring service.
//!
//! One submission is one multipart request carrying the job description and
//! every resume file. The call is all-or-nothing: a transport error, a
//! non-success status or an undecodable body fails the whole batch. No retry.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::candidate::Skills;

const MATCH_PATH: &str = "/match";

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A resume file as received from the uploader.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// One scored resume as returned by the service. Fields the service adds
/// beyond these (such as a suggested tag) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoredMatch {
    pub filename: String,
    pub score: f64,
    #[serde(default)]
    pub skills: Skills,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub why_matched: String,
}

#[derive(Debug, Deserialize)]
struct MatchResponse {
    matches: Vec<ScoredMatch>,
}

/// Carried in `AppState` as `Arc<dyn ScoringClient>`.
#[async_trait]
pub trait ScoringClient: Send + Sync {
    async fn score(
        &self,
        job_description: &str,
        files: Vec<ResumeFile>,
    ) -> Result<Vec<ScoredMatch>, ScoringError>;
}

#[derive(Clone)]
pub struct HttpScoringClient {
    client: Client,
    endpoint: String,
}

impl HttpScoringClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ScoringError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: format!("{}{MATCH_PATH}", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn build_form(job_description: &str, files: Vec<ResumeFile>) -> Result<Form, ScoringError> {
    let mut form = Form::new().text("job_description", job_description.to_string());
    for file in files {
        let mut part = Part::bytes(file.bytes.to_vec()).file_name(file.filename);
        if let Some(content_type) = file.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }
        form = form.part("resumes", part);
    }
    Ok(form)
}

#[async_trait]
impl ScoringClient for HttpScoringClient {
    async fn score(
        &self,
        job_description: &str,
        files: Vec<ResumeFile>,
    ) -> Result<Vec<ScoredMatch>, ScoringError> {
        let file_count = files.len();
        let form = build_form(job_description, files)?;

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ScoringError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: MatchResponse = serde_json::from_str(&body)?;
        debug!(
            "Scoring call succeeded: files={}, matches={}",
            file_count,
            parsed.matches.len()
        );
        Ok(parsed.matches)
    }
}
