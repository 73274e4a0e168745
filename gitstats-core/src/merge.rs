//! Best-effort inference of merge direction from commit messages.
//!
//! Patterns are tried in order and the first match wins. A message no pattern
//! recognises yields [`UNKNOWN_BRANCH`] for both ends; that is data, not an
//! error. Nothing here checks that the named branches exist.

use crate::commit::CommitRecord;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Branch name reported when no pattern matches
pub const UNKNOWN_BRANCH: &str = "unknown";

/// Target assumed by patterns that only name the source
pub const DEFAULT_TARGET_BRANCH: &str = "main";

static MERGE_BRANCH_INTO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Merge branch '([^']+)' into (\S+)").unwrap());
static MERGE_BRANCH: Lazy<Regex> = Lazy::new(|| Regex::new(r"Merge branch '([^']+)'").unwrap());
static MERGE_PULL_REQUEST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Merge pull request #(\d+) from (\S+)").unwrap());
static MERGE_INTO: Lazy<Regex> = Lazy::new(|| Regex::new(r"Merge (\S+) into (\S+)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MergeType {
    PullRequest,
    FeatureBranch,
    Hotfix,
    ReleaseBranch,
    DevelopmentBranch,
    RegularMerge,
}

impl MergeType {
    /// Case-insensitive keyword rules, highest priority first
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("pull request") || lower.contains("pr") {
            MergeType::PullRequest
        } else if lower.contains("feature") {
            MergeType::FeatureBranch
        } else if lower.contains("hotfix") || lower.contains("fix") {
            MergeType::Hotfix
        } else if lower.contains("release") {
            MergeType::ReleaseBranch
        } else if lower.contains("develop") {
            MergeType::DevelopmentBranch
        } else {
            MergeType::RegularMerge
        }
    }
}

/// Source and target branch read out of a merge message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeDirection {
    pub source_branch: String,
    pub target_branch: String,
    /// Set when the message is a pull request merge
    pub pr_number: Option<u64>,
}

impl MergeDirection {
    pub fn unknown() -> Self {
        MergeDirection {
            source_branch: UNKNOWN_BRANCH.to_string(),
            target_branch: UNKNOWN_BRANCH.to_string(),
            pr_number: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.source_branch == UNKNOWN_BRANCH && self.target_branch == UNKNOWN_BRANCH
    }

    pub fn from_message(message: &str) -> Self {
        if let Some(caps) = MERGE_BRANCH_INTO.captures(message) {
            return Self::named(&caps[1], &caps[2], None);
        }
        if let Some(caps) = MERGE_BRANCH.captures(message) {
            return Self::named(&caps[1], DEFAULT_TARGET_BRANCH, None);
        }
        if let Some(caps) = MERGE_PULL_REQUEST.captures(message) {
            let pr_number = caps[1].parse().ok();
            return Self::named(&caps[2], DEFAULT_TARGET_BRANCH, pr_number);
        }
        if let Some(caps) = MERGE_INTO.captures(message) {
            return Self::named(&caps[1], &caps[2], None);
        }
        Self::unknown()
    }

    fn named(source: &str, target: &str, pr_number: Option<u64>) -> Self {
        MergeDirection {
            source_branch: strip_quotes(source).to_string(),
            target_branch: strip_quotes(target).to_string(),
            pr_number,
        }
    }
}

fn strip_quotes(name: &str) -> &str {
    name.trim_matches(|c| c == '\'' || c == '"' || c == '`')
}

/// Light summary of one parent of a merge commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentSummary {
    pub short_hash: String,
    /// `None` when the parent object is outside a shallow clone
    pub author: Option<String>,
    pub message: Option<String>,
}

/// A merge commit with its inferred direction and category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRecord {
    pub short_hash: String,
    pub full_hash: String,
    pub author: String,
    pub timestamp: NaiveDateTime,
    pub message: String,
    pub source_branch: String,
    pub target_branch: String,
    pub merge_type: MergeType,
    pub pr_number: Option<u64>,
    pub parents_count: usize,
    pub parents_info: Vec<ParentSummary>,
}

pub struct MergeClassifier;

impl MergeClassifier {
    /// Classify a merge commit. Callers pass only commits where
    /// [`CommitRecord::is_merge`] holds.
    pub fn classify(commit: &CommitRecord, parents_info: Vec<ParentSummary>) -> MergeRecord {
        debug_assert!(commit.is_merge());
        let direction = MergeDirection::from_message(&commit.message);

        MergeRecord {
            short_hash: commit.short_hash.clone(),
            full_hash: commit.full_hash.clone(),
            author: commit.author_name.clone(),
            timestamp: commit.timestamp,
            message: commit.message.clone(),
            source_branch: direction.source_branch,
            target_branch: direction.target_branch,
            merge_type: MergeType::from_message(&commit.message),
            pr_number: direction.pr_number,
            parents_count: commit.parent_hashes.len(),
            parents_info,
        }
    }
}
