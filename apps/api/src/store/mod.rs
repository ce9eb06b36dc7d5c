//! Durable source of truth for jobs and candidate records.
//!
//! Two logical collections: `jobs` and `resumes`. Every query is an equality
//! filter on the owner (and job), every write targets a single document.
//! There is no multi-document transaction; callers that write in bulk do so
//! one document at a time.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::candidate::{CandidateRecord, NewCandidate, Tag};
use crate::models::job::{Job, NewJob};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{collection} document {id} not found")]
    NotFound { collection: &'static str, id: Uuid },

    #[error("Corrupt {collection} document {id}: {reason}")]
    Corrupt {
        collection: &'static str,
        id: Uuid,
        reason: String,
    },
}

/// Carried in `AppState` as `Arc<dyn DocumentStore>`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_job(&self, job: NewJob) -> Result<Job, StoreError>;

    /// All jobs owned by `owner_id`. Order is not part of the contract.
    async fn jobs_by_owner(&self, owner_id: Uuid) -> Result<Vec<Job>, StoreError>;

    /// Inserts a candidate record tagged `Unreviewed`.
    async fn insert_candidate(&self, candidate: NewCandidate)
        -> Result<CandidateRecord, StoreError>;

    async fn candidates_for_job(
        &self,
        owner_id: Uuid,
        job_id: Uuid,
    ) -> Result<Vec<CandidateRecord>, StoreError>;

    /// Writes the tag field only. Fails with `NotFound` when no record with
    /// that id belongs to `owner_id`.
    async fn update_tag(&self, owner_id: Uuid, record_id: Uuid, tag: Tag)
        -> Result<(), StoreError>;

    async fn delete_candidate(&self, owner_id: Uuid, record_id: Uuid) -> Result<(), StoreError>;
}
