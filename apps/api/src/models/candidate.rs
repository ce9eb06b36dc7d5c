use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Reviewer disposition on a candidate record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Unreviewed,
    Shortlisted,
    Maybe,
    Rejected,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Unreviewed => "Unreviewed",
            Tag::Shortlisted => "Shortlisted",
            Tag::Maybe => "Maybe",
            Tag::Rejected => "Rejected",
        }
    }

    /// True for the tags a reviewer may assign. `Unreviewed` is only ever
    /// set at ingestion.
    pub fn is_review_decision(&self) -> bool {
        !matches!(self, Tag::Unreviewed)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unreviewed" => Ok(Tag::Unreviewed),
            "Shortlisted" => Ok(Tag::Shortlisted),
            "Maybe" => Ok(Tag::Maybe),
            "Rejected" => Ok(Tag::Rejected),
            other => Err(format!("unknown tag '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    #[serde(default)]
    pub technical: Vec<String>,
    #[serde(default)]
    pub soft: Vec<String>,
}

/// One resume's scored result against a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub job_id: Uuid,
    pub filename: String,
    pub score: f64,
    pub tag: Tag,
    pub skills: Skills,
    pub summary: String,
    pub rationale: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the `resumes` collection.
/// Carries no tag: every record starts out `Unreviewed`.
#[derive(Debug, Clone)]
pub struct NewCandidate {
    pub owner_id: Uuid,
    pub job_id: Uuid,
    pub filename: String,
    pub score: f64,
    pub skills: Skills,
    pub summary: String,
    pub rationale: String,
}

impl NewCandidate {
    pub fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> CandidateRecord {
        CandidateRecord {
            id,
            owner_id: self.owner_id,
            job_id: self.job_id,
            filename: self.filename,
            score: self.score,
            tag: Tag::Unreviewed,
            skills: self.skills,
            summary: self.summary,
            rationale: self.rationale,
            created_at,
        }
    }
}

/// Row shape of the `resumes` table; `tag` is stored as text.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub job_id: Uuid,
    pub filename: String,
    pub score: f64,
    pub tag: String,
    pub skills: Json<Skills>,
    pub summary: String,
    pub rationale: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CandidateRow> for CandidateRecord {
    type Error = String;

    fn try_from(row: CandidateRow) -> Result<Self, Self::Error> {
        Ok(CandidateRecord {
            id: row.id,
            owner_id: row.owner_id,
            job_id: row.job_id,
            filename: row.filename,
            score: row.score,
            tag: row.tag.parse()?,
            skills: row.skills.0,
            summary: row.summary,
            rationale: row.rationale,
            created_at: row.created_at,
        })
    }
}
