use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::candidate::{CandidateRecord, NewCandidate, Tag};
use crate::models::job::{Job, NewJob};
use crate::store::{DocumentStore, StoreError};

#[derive(Default)]
struct Collections {
    jobs: Vec<Job>,
    resumes: Vec<CandidateRecord>,
}

/// Process-local document store. Used when no `DATABASE_URL` is configured
/// and as the backing store in tests. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_job(&self, job: NewJob) -> Result<Job, StoreError> {
        let job = Job {
            id: Uuid::new_v4(),
            owner_id: job.owner_id,
            title: job.title,
            description: job.description,
            created_at: Utc::now(),
        };
        self.collections.write().await.jobs.push(job.clone());
        Ok(job)
    }

    async fn jobs_by_owner(&self, owner_id: Uuid) -> Result<Vec<Job>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .jobs
            .iter()
            .filter(|j| j.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn insert_candidate(
        &self,
        candidate: NewCandidate,
    ) -> Result<CandidateRecord, StoreError> {
        let record = candidate.into_record(Uuid::new_v4(), Utc::now());
        self.collections.write().await.resumes.push(record.clone());
        Ok(record)
    }

    async fn candidates_for_job(
        &self,
        owner_id: Uuid,
        job_id: Uuid,
    ) -> Result<Vec<CandidateRecord>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .resumes
            .iter()
            .filter(|r| r.owner_id == owner_id && r.job_id == job_id)
            .cloned()
            .collect())
    }

    async fn update_tag(
        &self,
        owner_id: Uuid,
        record_id: Uuid,
        tag: Tag,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let record = collections
            .resumes
            .iter_mut()
            .find(|r| r.id == record_id && r.owner_id == owner_id)
            .ok_or(StoreError::NotFound {
                collection: "resumes",
                id: record_id,
            })?;
        record.tag = tag;
        Ok(())
    }

    async fn delete_candidate(&self, owner_id: Uuid, record_id: Uuid) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let before = collections.resumes.len();
        collections
            .resumes
            .retain(|r| !(r.id == record_id && r.owner_id == owner_id));
        if collections.resumes.len() == before {
            return Err(StoreError::NotFound {
                collection: "resumes",
                id: record_id,
            });
        }
        Ok(())
    }
}
