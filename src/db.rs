//! Submission store
//!
//! Completed intake flows land in a single SQLite table for review.
//! One file, no server; the reviewer flips `status` by hand.

use crate::intake::{ProjectSubmission, SubmissionStatus, Teammate};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

/// Open (or create) the database with schema
pub fn init_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
    }

    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database at {:?}", path))?;

    conn.execute_batch(SCHEMA)?;

    Ok(conn)
}

const SCHEMA: &str = r#"
-- Submissions from the intake flow
CREATE TABLE IF NOT EXISTS project_submissions (
    id TEXT PRIMARY KEY,
    product_name TEXT NOT NULL,
    project_url TEXT NOT NULL,
    description TEXT NOT NULL,
    logo_url TEXT,
    category TEXT,
    tags_json TEXT NOT NULL DEFAULT '[]',       -- JSON array of strings
    github_url TEXT,
    twitter_profile TEXT,
    founder_name TEXT NOT NULL,
    founder_twitter TEXT NOT NULL,
    teammates_json TEXT NOT NULL DEFAULT '[]',  -- JSON array of {name, twitter}
    status TEXT NOT NULL DEFAULT 'pending',     -- pending | approved | rejected
    submitted_by TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_submissions_status ON project_submissions(status);
CREATE INDEX IF NOT EXISTS idx_submissions_created ON project_submissions(created_at);
"#;

/// Store one completed submission
pub fn insert_submission(conn: &Connection, submission: &ProjectSubmission) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO project_submissions (
            id, product_name, project_url, description, logo_url, category,
            tags_json, github_url, twitter_profile, founder_name, founder_twitter,
            teammates_json, status, submitted_by, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        "#,
        params![
            submission.id,
            submission.product_name,
            submission.project_url,
            submission.description,
            submission.logo_url,
            submission.category,
            serde_json::to_string(&submission.tags)?,
            submission.github_url,
            submission.twitter_profile,
            submission.founder_name,
            submission.founder_twitter,
            serde_json::to_string(&submission.teammates)?,
            submission.status.as_str(),
            submission.submitted_by,
            submission.created_at.to_rfc3339(),
        ],
    )
    .with_context(|| format!("Failed to store submission {}", submission.product_name))?;

    Ok(())
}

/// Columns as stored, before JSON and timestamp decoding
struct SubmissionRow {
    id: String,
    product_name: String,
    project_url: String,
    description: String,
    logo_url: Option<String>,
    category: Option<String>,
    tags_json: String,
    github_url: Option<String>,
    twitter_profile: Option<String>,
    founder_name: String,
    founder_twitter: String,
    teammates_json: String,
    status: String,
    submitted_by: Option<String>,
    created_at: String,
}

impl SubmissionRow {
    fn decode(self) -> Result<ProjectSubmission> {
        let tags: Vec<String> = serde_json::from_str(&self.tags_json)
            .with_context(|| format!("Bad tags on submission {}", self.id))?;
        let teammates: Vec<Teammate> = serde_json::from_str(&self.teammates_json)
            .with_context(|| format!("Bad teammates on submission {}", self.id))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .with_context(|| format!("Bad created_at on submission {}", self.id))?
            .with_timezone(&Utc);
        let status = SubmissionStatus::parse(&self.status)
            .with_context(|| format!("Unknown status {:?} on submission {}", self.status, self.id))?;

        Ok(ProjectSubmission {
            id: self.id,
            product_name: self.product_name,
            project_url: self.project_url,
            description: self.description,
            logo_url: self.logo_url,
            category: self.category,
            tags,
            github_url: self.github_url,
            twitter_profile: self.twitter_profile,
            founder_name: self.founder_name,
            founder_twitter: self.founder_twitter,
            teammates,
            status,
            submitted_by: self.submitted_by,
            created_at,
        })
    }
}

/// Submissions, newest first. `None` lists every status.
pub fn list_submissions(
    conn: &Connection,
    status: Option<SubmissionStatus>,
) -> Result<Vec<ProjectSubmission>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, product_name, project_url, description, logo_url, category,
               tags_json, github_url, twitter_profile, founder_name, founder_twitter,
               teammates_json, status, submitted_by, created_at
        FROM project_submissions
        WHERE ?1 IS NULL OR status = ?1
        ORDER BY created_at DESC
        "#,
    )?;

    let rows = stmt
        .query_map(params![status.map(|s| s.as_str())], |row| {
            Ok(SubmissionRow {
                id: row.get(0)?,
                product_name: row.get(1)?,
                project_url: row.get(2)?,
                description: row.get(3)?,
                logo_url: row.get(4)?,
                category: row.get(5)?,
                tags_json: row.get(6)?,
                github_url: row.get(7)?,
                twitter_profile: row.get(8)?,
                founder_name: row.get(9)?,
                founder_twitter: row.get(10)?,
                teammates_json: row.get(11)?,
                status: row.get(12)?,
                submitted_by: row.get(13)?,
                created_at: row.get(14)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(SubmissionRow::decode).collect()
}

/// (status, count) pairs, alphabetical by status
pub fn count_by_status(conn: &Connection) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT status, COUNT(*) FROM project_submissions GROUP BY status ORDER BY status",
    )?;
    let counts = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(counts)
}

/// Move a submission to a new review state. Returns false if the id is unknown.
pub fn set_status(conn: &Connection, id: &str, status: SubmissionStatus) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE project_submissions SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(changed > 0)
}
