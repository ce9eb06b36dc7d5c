use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::candidate::{CandidateRecord, CandidateRow, NewCandidate, Tag};
use crate::models::job::{Job, NewJob};
use crate::store::{DocumentStore, StoreError};

const RESUME_COLUMNS: &str =
    "id, owner_id, job_id, filename, score, tag, skills, summary, rationale, created_at";

/// PostgreSQL-backed document store. `created_at` is assigned by the database.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_record(row: CandidateRow) -> Result<CandidateRecord, StoreError> {
    let id = row.id;
    CandidateRecord::try_from(row).map_err(|reason| StoreError::Corrupt {
        collection: "resumes",
        id,
        reason,
    })
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert_job(&self, job: NewJob) -> Result<Job, StoreError> {
        Ok(sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (id, owner_id, title, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, title, description, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(job.owner_id)
        .bind(&job.title)
        .bind(&job.description)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn jobs_by_owner(&self, owner_id: Uuid) -> Result<Vec<Job>, StoreError> {
        Ok(sqlx::query_as::<_, Job>(
            "SELECT id, owner_id, title, description, created_at FROM jobs WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_candidate(
        &self,
        candidate: NewCandidate,
    ) -> Result<CandidateRecord, StoreError> {
        let row = sqlx::query_as::<_, CandidateRow>(&format!(
            r#"
            INSERT INTO resumes
                (id, owner_id, job_id, filename, score, tag, skills, summary, rationale)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {RESUME_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(candidate.owner_id)
        .bind(candidate.job_id)
        .bind(&candidate.filename)
        .bind(candidate.score)
        .bind(Tag::Unreviewed.as_str())
        .bind(Json(&candidate.skills))
        .bind(&candidate.summary)
        .bind(&candidate.rationale)
        .fetch_one(&self.pool)
        .await?;

        into_record(row)
    }

    async fn candidates_for_job(
        &self,
        owner_id: Uuid,
        job_id: Uuid,
    ) -> Result<Vec<CandidateRecord>, StoreError> {
        // Ordered by insertion so score series plot in submission order.
        let rows = sqlx::query_as::<_, CandidateRow>(&format!(
            "SELECT {RESUME_COLUMNS} FROM resumes WHERE owner_id = $1 AND job_id = $2 \
             ORDER BY created_at, id"
        ))
        .bind(owner_id)
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(into_record).collect()
    }

    async fn update_tag(
        &self,
        owner_id: Uuid,
        record_id: Uuid,
        tag: Tag,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE resumes SET tag = $1 WHERE id = $2 AND owner_id = $3")
            .bind(tag.as_str())
            .bind(record_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection: "resumes",
                id: record_id,
            });
        }
        Ok(())
    }

    async fn delete_candidate(&self, owner_id: Uuid, record_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND owner_id = $2")
            .bind(record_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection: "resumes",
                id: record_id,
            });
        }
        Ok(())
    }
}
