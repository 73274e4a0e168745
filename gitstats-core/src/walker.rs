use crate::commit::{short_hash, truncate_message, CommitRecord};
use crate::error::{AnalyzerError, Result};
use crate::merge::ParentSummary;
use chrono::NaiveDateTime;
use git2::{Oid, Repository as Git2Repository, Sort};
use tracing::{debug, warn};

/// Which commits a walk visits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOptions {
    /// Any revision git understands: `HEAD`, a branch name, a hash
    pub reference: String,
    pub since: Option<NaiveDateTime>,
    pub until: Option<NaiveDateTime>,
    /// Stop after this many commits have been accepted
    pub max_count: Option<usize>,
}

impl WalkOptions {
    pub fn new(reference: impl Into<String>) -> Self {
        WalkOptions {
            reference: reference.into(),
            since: None,
            until: None,
            max_count: None,
        }
    }

    pub fn between(mut self, since: Option<NaiveDateTime>, until: Option<NaiveDateTime>) -> Self {
        self.since = since;
        self.until = until;
        self
    }

    pub fn limit(mut self, max_count: usize) -> Self {
        self.max_count = Some(max_count);
        self
    }

    fn accepts(&self, timestamp: NaiveDateTime) -> bool {
        self.since.map_or(true, |since| timestamp >= since)
            && self.until.map_or(true, |until| timestamp <= until)
    }
}

/// Walks history reachable from a revision, newest first
pub struct CommitWalker<'repo> {
    repo: &'repo Git2Repository,
}

impl<'repo> CommitWalker<'repo> {
    pub fn new(repo: &'repo Git2Repository) -> Self {
        CommitWalker { repo }
    }

    /// Ids of the commits selected by `opts`, in history order.
    ///
    /// Fails with [`AnalyzerError::Traversal`] when the reference does not
    /// resolve or the history cannot be read.
    pub fn commit_ids(&self, opts: &WalkOptions) -> Result<Vec<Oid>> {
        let traversal = |e| AnalyzerError::traversal(&opts.reference, e);

        let tip = self
            .repo
            .revparse_single(&opts.reference)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(traversal)?;

        let mut revwalk = self.repo.revwalk().map_err(traversal)?;
        revwalk.set_sorting(Sort::TIME).map_err(traversal)?;
        revwalk.push(tip.id()).map_err(traversal)?;

        let mut ids = Vec::new();
        for oid in revwalk {
            if opts.max_count.is_some_and(|max| ids.len() >= max) {
                break;
            }
            let oid = oid.map_err(traversal)?;
            if opts.since.is_some() || opts.until.is_some() {
                let commit = self.repo.find_commit(oid).map_err(traversal)?;
                if !opts.accepts(crate::commit::naive_time(commit.time())) {
                    continue;
                }
            }
            ids.push(oid);
        }

        debug!(reference = %opts.reference, commits = ids.len(), "walked history");
        Ok(ids)
    }

    /// Normalized record of a single commit
    pub fn record(&self, oid: Oid) -> Result<CommitRecord> {
        let commit = self.repo.find_commit(oid)?;
        CommitRecord::from_git(self.repo, &commit)
    }

    /// Records for the selected commits. Commits whose record cannot be built
    /// are left out.
    pub fn walk(&self, opts: &WalkOptions) -> Result<Vec<CommitRecord>> {
        let ids = self.commit_ids(opts)?;
        Ok(ids
            .into_iter()
            .filter_map(|oid| match self.record(oid) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(commit = %oid, error = %e, "skipping unreadable commit");
                    None
                }
            })
            .collect())
    }

    /// Like [`walk`](Self::walk), but an unwalkable reference yields an empty
    /// history instead of an error
    pub fn walk_or_empty(&self, opts: &WalkOptions) -> Vec<CommitRecord> {
        self.walk(opts).unwrap_or_else(|e| {
            warn!(reference = %opts.reference, error = %e, "history unavailable");
            Vec::new()
        })
    }

    /// Summaries of every parent of `commit`. Parents missing from a shallow
    /// clone keep their hash but carry no author or message.
    pub fn parent_summaries(&self, commit: &CommitRecord, width: usize) -> Vec<ParentSummary> {
        commit
            .parent_hashes
            .iter()
            .map(|hash| {
                let parent = Oid::from_str(hash)
                    .and_then(|oid| self.repo.find_commit(oid))
                    .ok();
                ParentSummary {
                    short_hash: short_hash(hash),
                    author: parent
                        .as_ref()
                        .map(|c| c.author().name().unwrap_or("Unknown").to_string()),
                    message: parent
                        .as_ref()
                        .map(|c| truncate_message(&String::from_utf8_lossy(c.message_bytes()), width)),
                }
            })
            .collect()
    }
}
