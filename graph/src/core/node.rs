use gitstats_core::CommitRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One unique commit of the branch graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Commit with its message cut for display
    pub commit: CommitRecord,
    /// Every branch whose traversal reached this commit
    pub branches: BTreeSet<String>,
    pub is_merge: bool,
}

impl GraphNode {
    pub fn new(commit: CommitRecord, branches: BTreeSet<String>) -> Self {
        let is_merge = commit.is_merge();
        Self {
            commit,
            branches,
            is_merge,
        }
    }

    pub fn id(&self) -> &str {
        &self.commit.short_hash
    }

    /// Check if this is a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.commit.is_root()
    }

    /// Reached from more than one branch tip
    pub fn is_shared(&self) -> bool {
        self.branches.len() > 1
    }
}
