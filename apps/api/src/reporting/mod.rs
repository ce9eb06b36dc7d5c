//! Aggregation and reporting over a ledger view. Everything here is a pure
//! projection of the records passed in; nothing is cached or persisted.

use serde::Serialize;

use crate::models::candidate::{CandidateRecord, Tag};

pub mod handlers;

pub const EXPORT_FILENAME: &str = "shortlisted_candidates.csv";
const EXPORT_HEADER: &str = "Filename,Score,Tag";

const INTERVIEW_SUBJECT: &str = "You're Shortlisted!";
const INTERVIEW_SIGNATURE: &str = "— ResumeMatcher.AI";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub name: Tag,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorePoint {
    pub filename: String,
    pub score: f64,
}

/// Counts records per tag, in the order each tag is first seen.
pub fn compute_tag_summary(records: &[CandidateRecord]) -> Vec<TagCount> {
    let mut summary: Vec<TagCount> = Vec::new();
    for record in records {
        match summary.iter_mut().find(|entry| entry.name == record.tag) {
            Some(entry) => entry.count += 1,
            None => summary.push(TagCount {
                name: record.tag,
                count: 1,
            }),
        }
    }
    summary
}

pub fn compute_score_series(records: &[CandidateRecord]) -> Vec<ScorePoint> {
    records
        .iter()
        .map(|r| ScorePoint {
            filename: r.filename.clone(),
            score: r.score,
        })
        .collect()
}

/// Shortlisted candidates as CSV: header row, then one `filename,score,tag`
/// row each, newline-separated. Fields are written as-is; a filename
/// containing a comma or quote yields a malformed row.
pub fn export_shortlisted(records: &[CandidateRecord]) -> String {
    std::iter::once(EXPORT_HEADER.to_string())
        .chain(
            records
                .iter()
                .filter(|r| r.tag == Tag::Shortlisted)
                .map(|r| format!("{},{},{}", r.filename, r.score, r.tag)),
        )
        .collect::<Vec<_>>()
        .join("\n")
}

/// A `mailto:` link that opens a pre-filled interview invitation for a
/// shortlisted candidate. Returns `None` for any other tag.
pub fn interview_mailto(record: &CandidateRecord) -> Option<String> {
    if record.tag != Tag::Shortlisted {
        return None;
    }
    let body = format!(
        "Hi {},\r\n\r\nCongratulations! You've been shortlisted for the role. \
         We'll follow up shortly with next steps.\r\n\r\n{INTERVIEW_SIGNATURE}",
        record.filename
    );
    Some(format!(
        "mailto:?subject={}&body={}",
        percent_encode(INTERVIEW_SUBJECT),
        percent_encode(&body)
    ))
}

/// RFC 3986 percent-encoding; only unreserved characters pass through.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
