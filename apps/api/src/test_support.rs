//! Fixtures shared by the workflow tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::candidate::{CandidateRecord, NewCandidate, Skills, Tag};
use crate::models::job::{Job, NewJob};
use crate::models::user::Identity;
use crate::session::Session;
use crate::store::{DocumentStore, MemoryStore, StoreError};

pub fn new_session() -> Session {
    Session::new(Identity {
        user_id: Uuid::new_v4(),
        email: format!("{}@example.com", Uuid::new_v4()),
        display_name: Some("Recruiter".to_string()),
    })
}

pub async fn seed_candidate(
    store: &dyn DocumentStore,
    session: &Session,
    job_id: Uuid,
    filename: &str,
    score: f64,
) -> CandidateRecord {
    store
        .insert_candidate(NewCandidate {
            owner_id: session.user_id(),
            job_id,
            filename: filename.to_string(),
            score,
            skills: Skills {
                technical: vec!["rust".to_string()],
                soft: vec!["communication".to_string()],
            },
            summary: format!("{filename} summary"),
            rationale: format!("{filename} rationale"),
        })
        .await
        .unwrap()
}

fn unavailable() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

/// `MemoryStore` with switchable faults.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    faults: Mutex<Faults>,
}

#[derive(Default)]
struct Faults {
    queries: bool,
    query_budget: Option<usize>,
    insert_filenames: HashSet<String>,
    delete_ids: HashSet<Uuid>,
}

impl FlakyStore {
    pub fn fail_queries(&self, on: bool) {
        self.faults.lock().unwrap().queries = on;
    }

    /// Lets the next `n` queries through, then fails every query after them.
    pub fn fail_queries_after(&self, n: usize) {
        self.faults.lock().unwrap().query_budget = Some(n);
    }

    fn query_fails(&self) -> bool {
        let mut faults = self.faults.lock().unwrap();
        if faults.queries {
            return true;
        }
        match faults.query_budget.as_mut() {
            Some(0) => true,
            Some(n) => {
                *n -= 1;
                false
            }
            None => false,
        }
    }

    pub fn fail_insert_of(&self, filename: &str) {
        self.faults
            .lock()
            .unwrap()
            .insert_filenames
            .insert(filename.to_string());
    }

    pub fn fail_delete_of(&self, id: Uuid) {
        self.faults.lock().unwrap().delete_ids.insert(id);
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn insert_job(&self, job: NewJob) -> Result<Job, StoreError> {
        self.inner.insert_job(job).await
    }

    async fn jobs_by_owner(&self, owner_id: Uuid) -> Result<Vec<Job>, StoreError> {
        if self.query_fails() {
            return Err(unavailable());
        }
        self.inner.jobs_by_owner(owner_id).await
    }

    async fn insert_candidate(
        &self,
        candidate: NewCandidate,
    ) -> Result<CandidateRecord, StoreError> {
        if self
            .faults
            .lock()
            .unwrap()
            .insert_filenames
            .contains(&candidate.filename)
        {
            return Err(unavailable());
        }
        self.inner.insert_candidate(candidate).await
    }

    async fn candidates_for_job(
        &self,
        owner_id: Uuid,
        job_id: Uuid,
    ) -> Result<Vec<CandidateRecord>, StoreError> {
        if self.query_fails() {
            return Err(unavailable());
        }
        self.inner.candidates_for_job(owner_id, job_id).await
    }

    async fn update_tag(
        &self,
        owner_id: Uuid,
        record_id: Uuid,
        tag: Tag,
    ) -> Result<(), StoreError> {
        self.inner.update_tag(owner_id, record_id, tag).await
    }

    async fn delete_candidate(&self, owner_id: Uuid, record_id: Uuid) -> Result<(), StoreError> {
        if self.faults.lock().unwrap().delete_ids.contains(&record_id) {
            return Err(unavailable());
        }
        self.inner.delete_candidate(owner_id, record_id).await
    }
}
