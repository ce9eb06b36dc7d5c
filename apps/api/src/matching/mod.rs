//! Match submission: send the selected job's description plus a batch of
//! resumes to the scoring service and ingest the results into the ledger.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::batch::BatchReport;
use crate::errors::AppError;
use crate::ledger::{self, NO_JOB_SELECTED};
use crate::models::candidate::{CandidateRecord, NewCandidate};
use crate::scoring_client::{ResumeFile, ScoredMatch, ScoringClient};
use crate::session::Session;
use crate::store::DocumentStore;

pub mod handlers;

#[derive(Debug, Serialize)]
pub struct MatchOutcome {
    pub job_id: Uuid,
    pub report: BatchReport,
    pub candidates: Vec<CandidateRecord>,
}

/// Scores `files` against the selected job and records one `Unreviewed`
/// candidate per returned match.
///
/// A scoring failure aborts before any write. Once a response is in hand,
/// records are written one at a time and per-record failures are captured in
/// the report; records already written are kept. The session is busy for the
/// duration and a concurrent submission is refused.
pub async fn submit_match(
    store: &dyn DocumentStore,
    scorer: &dyn ScoringClient,
    session: &Session,
    files: Vec<ResumeFile>,
) -> Result<MatchOutcome, AppError> {
    let job = session
        .selected_job()
        .await
        .filter(|job| !job.description.trim().is_empty())
        .ok_or_else(|| AppError::Validation(NO_JOB_SELECTED.to_string()))?;

    let _busy = session.try_begin_busy().ok_or(AppError::Busy)?;

    info!(
        user_id = %session.user_id(),
        job_id = %job.id,
        files = files.len(),
        "Submitting resumes for scoring"
    );
    let matches = scorer.score(&job.description, files).await.map_err(|e| {
        warn!(job_id = %job.id, "Scoring failed, batch abandoned: {e}");
        AppError::from(e)
    })?;

    let mut report = ingest_matches(store, session.user_id(), job.id, matches).await;
    if !report.is_complete() {
        warn!(
            job_id = %job.id,
            failed = report.failures.len(),
            written = report.succeeded.len(),
            "Match ingestion partially failed"
        );
    }

    // The writes are durable by now; a failed reload must not hide them.
    let candidates = match ledger::refresh(store, session, job.id).await {
        Ok(candidates) => candidates,
        Err(e) => {
            report.record_refresh_failure(&e);
            ledger::view(session, job.id).await
        }
    };

    Ok(MatchOutcome {
        job_id: job.id,
        report,
        candidates,
    })
}

async fn ingest_matches(
    store: &dyn DocumentStore,
    owner_id: Uuid,
    job_id: Uuid,
    matches: Vec<ScoredMatch>,
) -> BatchReport {
    let mut report = BatchReport::default();
    for scored in matches {
        let filename = scored.filename.clone();
        let candidate = NewCandidate {
            owner_id,
            job_id,
            filename: scored.filename,
            score: scored.score,
            skills: scored.skills,
            summary: scored.summary,
            rationale: scored.why_matched,
        };
        match store.insert_candidate(candidate).await {
            Ok(record) => report.record_success(record.id),
            Err(e) => report.record_failure(filename, e),
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;

    use super::*;
    use crate::jobs::{create_job, select_job};
    use crate::models::candidate::{Skills, Tag};
    use crate::scoring_client::ScoringError;
    use crate::store::MemoryStore;
    use crate::test_support::{new_session, seed_candidate, FlakyStore};

    /// Returns one match per file, deserialized from the wire format the real
    /// service uses, including a suggested tag that must be ignored.
    #[derive(Default)]
    struct StubScorer {
        fail: bool,
        calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    #[async_trait]
    impl ScoringClient for StubScorer {
        async fn score(
            &self,
            job_description: &str,
            files: Vec<ResumeFile>,
        ) -> Result<Vec<ScoredMatch>, ScoringError> {
            let names: Vec<String> = files.iter().map(|f| f.filename.clone()).collect();
            self.calls
                .lock()
                .unwrap()
                .push((job_description.to_string(), names.clone()));
            if self.fail {
                return Err(ScoringError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            names
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    serde_json::from_value(serde_json::json!({
                        "filename": name,
                        "score": 80 + i,
                        "skills": {"technical": ["rust"], "soft": ["empathy"]},
                        "summary": "solid",
                        "why_matched": "systems experience",
                        "tag": "Shortlisted"
                    }))
                    .map_err(ScoringError::Parse)
                })
                .collect()
        }
    }

    fn pdf(name: &str) -> ResumeFile {
        ResumeFile {
            filename: name.to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: Bytes::from_static(b"%PDF-1.4"),
        }
    }

    #[tokio::test]
    async fn test_two_files_yield_two_unreviewed_records() {
        let store = MemoryStore::new();
        let scorer = StubScorer::default();
        let session = new_session();
        let job = create_job(&store, &session, "Engineer", "Rust services").await.unwrap();
        select_job(&store, &session, job.id).await.unwrap();

        let outcome = submit_match(&store, &scorer, &session, vec![pdf("a.pdf"), pdf("b.pdf")])
            .await
            .unwrap();

        assert!(outcome.report.is_complete());
        assert_eq!(outcome.candidates.len(), 2);
        assert!(outcome.candidates.iter().all(|c| c.tag == Tag::Unreviewed));
        assert!(outcome.candidates.iter().all(|c| c.job_id == job.id));
        assert!(outcome
            .candidates
            .iter()
            .all(|c| c.owner_id == session.user_id()));
        assert_eq!(outcome.candidates[0].rationale, "systems experience");
        assert_eq!(
            outcome.candidates[0].skills,
            Skills {
                technical: vec!["rust".to_string()],
                soft: vec!["empathy".to_string()],
            }
        );

        let calls = scorer.calls.lock().unwrap();
        assert_eq!(calls.len(), 1, "one batched request, not one per file");
        assert_eq!(calls[0].0, "Rust services");
        assert_eq!(calls[0].1, vec!["a.pdf", "b.pdf"]);
    }

    #[tokio::test]
    async fn test_no_selected_job_fails_before_scoring() {
        let store = MemoryStore::new();
        let scorer = StubScorer::default();
        let session = new_session();

        let err = submit_match(&store, &scorer, &session, vec![pdf("a.pdf")])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(ref m) if m == NO_JOB_SELECTED));
        assert!(scorer.calls.lock().unwrap().is_empty());
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_empty_file_list_is_passed_through() {
        let store = MemoryStore::new();
        let scorer = StubScorer::default();
        let session = new_session();
        let job = create_job(&store, &session, "Engineer", "Rust").await.unwrap();
        select_job(&store, &session, job.id).await.unwrap();

        let outcome = submit_match(&store, &scorer, &session, vec![]).await.unwrap();

        assert_eq!(scorer.calls.lock().unwrap().len(), 1);
        assert!(outcome.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_leaves_ledger_unchanged() {
        let store = MemoryStore::new();
        let scorer = StubScorer {
            fail: true,
            ..Default::default()
        };
        let session = new_session();
        let job = create_job(&store, &session, "Engineer", "Rust").await.unwrap();
        seed_candidate(&store, &session, job.id, "existing.pdf", 42.0).await;
        let before = select_job(&store, &session, job.id).await.unwrap().candidates;

        let err = submit_match(&store, &scorer, &session, vec![pdf("a.pdf"), pdf("b.pdf")])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::RemoteService(_)));
        assert!(!session.is_busy());
        assert_eq!(ledger::view(&session, job.id).await, before);
        let stored = store
            .candidates_for_job(session.user_id(), job.id)
            .await
            .unwrap();
        assert_eq!(stored, before, "no orphan records");
    }

    #[tokio::test]
    async fn test_write_failure_mid_batch_is_reported_as_partial() {
        let store = FlakyStore::default();
        let scorer = StubScorer::default();
        let session = new_session();
        let job = create_job(&store, &session, "Engineer", "Rust").await.unwrap();
        select_job(&store, &session, job.id).await.unwrap();
        store.fail_insert_of("b.pdf");

        let outcome = submit_match(
            &store,
            &scorer,
            &session,
            vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf")],
        )
        .await
        .unwrap();

        assert!(!outcome.report.is_complete());
        assert_eq!(outcome.report.attempted, 3);
        assert_eq!(outcome.report.failures[0].item, "b.pdf");
        let names: Vec<_> = outcome.candidates.iter().map(|c| c.filename.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "c.pdf"]);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_failed_reload_after_ingest_still_returns_report() {
        let store = FlakyStore::default();
        let scorer = StubScorer::default();
        let session = new_session();
        let job = create_job(&store, &session, "Engineer", "Rust").await.unwrap();
        seed_candidate(&store, &session, job.id, "existing.pdf", 42.0).await;
        select_job(&store, &session, job.id).await.unwrap();
        store.fail_queries(true);

        let outcome = submit_match(&store, &scorer, &session, vec![pdf("a.pdf")])
            .await
            .unwrap();

        assert!(outcome.report.is_complete());
        assert!(!outcome.report.is_clean());
        assert!(outcome.report.refresh_error.is_some());
        assert_eq!(outcome.report.succeeded.len(), 1);
        // Last view that loaded successfully.
        let names: Vec<_> = outcome.candidates.iter().map(|c| c.filename.as_str()).collect();
        assert_eq!(names, vec!["existing.pdf"]);
        assert!(!session.is_busy());

        store.fail_queries(false);
        let stored = store
            .candidates_for_job(session.user_id(), job.id)
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_submission_is_refused_while_busy() {
        let store = MemoryStore::new();
        let scorer = StubScorer::default();
        let session = new_session();
        let job = create_job(&store, &session, "Engineer", "Rust").await.unwrap();
        select_job(&store, &session, job.id).await.unwrap();

        let _held = session.try_begin_busy().unwrap();
        let err = submit_match(&store, &scorer, &session, vec![pdf("a.pdf")])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Busy));
        assert!(scorer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resubmission_creates_duplicate_entries() {
        let store = MemoryStore::new();
        let scorer = StubScorer::default();
        let session = new_session();
        let job = create_job(&store, &session, "Engineer", "Rust").await.unwrap();
        select_job(&store, &session, job.id).await.unwrap();

        submit_match(&store, &scorer, &session, vec![pdf("a.pdf")]).await.unwrap();
        let outcome = submit_match(&store, &scorer, &session, vec![pdf("a.pdf")])
            .await
            .unwrap();

        assert_eq!(outcome.candidates.len(), 2);
        assert_ne!(outcome.candidates[0].id, outcome.candidates[1].id);
    }
}
