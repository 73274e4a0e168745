use crate::diff::{Diff, FileChange};
use crate::error::Result;
use chrono::{DateTime, Duration, NaiveDateTime};
use git2::{Commit, Repository as Git2Repository};
use serde::{Deserialize, Serialize};

/// Length of the abbreviated hash carried by every record
pub const SHORT_HASH_LEN: usize = 8;

/// Normalized, immutable view of one commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub short_hash: String,
    pub full_hash: String,
    pub author_name: String,
    pub author_email: String,
    /// Committer time as wall clock in the committer's own offset
    pub timestamp: NaiveDateTime,
    pub message: String,
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub parent_hashes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileChange>,
}

impl CommitRecord {
    /// Build a record, including diff stats against the first parent
    pub fn from_git(repo: &Git2Repository, commit: &Commit) -> Result<Self> {
        let stats = Diff::new(repo).for_commit(commit)?;
        let full_hash = commit.id().to_string();
        let author = commit.author();

        Ok(CommitRecord {
            short_hash: short_hash(&full_hash),
            full_hash,
            author_name: author.name().unwrap_or("Unknown").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            timestamp: naive_time(commit.time()),
            message: String::from_utf8_lossy(commit.message_bytes()).trim().to_string(),
            files_changed: stats.files_changed,
            insertions: stats.insertions,
            deletions: stats.deletions,
            parent_hashes: commit.parent_ids().map(|oid| oid.to_string()).collect(),
            files: stats.files,
        })
    }

    pub fn lines_changed(&self) -> usize {
        self.insertions + self.deletions
    }

    pub fn is_merge(&self) -> bool {
        self.parent_hashes.len() > 1
    }

    pub fn is_root(&self) -> bool {
        self.parent_hashes.is_empty()
    }

    /// Copy with the message cut to `width` characters and the per-file
    /// breakdown dropped, as shown on graph nodes
    pub fn summarized(&self, width: usize) -> Self {
        CommitRecord {
            message: truncate_message(&self.message, width),
            files: Vec::new(),
            ..self.clone()
        }
    }
}

pub fn short_hash(full_hash: &str) -> String {
    full_hash.chars().take(SHORT_HASH_LEN).collect()
}

/// Local wall-clock time of a git timestamp, offset applied, zone dropped
pub fn naive_time(time: git2::Time) -> NaiveDateTime {
    let utc = DateTime::from_timestamp(time.seconds(), 0)
        .unwrap_or_default()
        .naive_utc();
    utc + Duration::minutes(i64::from(time.offset_minutes()))
}

/// First line of `message`, cut to `width` characters with a trailing ellipsis
pub fn truncate_message(message: &str, width: usize) -> String {
    let first_line = message.lines().next().unwrap_or("").trim();
    if first_line.chars().count() <= width {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(width).collect();
        format!("{}...", cut)
    }
}
