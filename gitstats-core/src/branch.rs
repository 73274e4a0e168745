use crate::commit::{naive_time, short_hash};
use crate::error::{AnalyzerError, Result};
use chrono::NaiveDateTime;
use git2::{BranchType, Oid, Repository as Git2Repository};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Summary of one local branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRecord {
    pub name: String,
    pub last_commit_hash: String,
    pub last_commit_timestamp: NaiveDateTime,
    pub last_author: String,
    pub commits_count: usize,
    /// True only for the checked-out branch
    pub is_active: bool,
}

/// A local branch name and the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTip {
    pub name: String,
    pub target: Oid,
}

pub struct BranchOps<'a> {
    repo: &'a Git2Repository,
}

impl<'a> BranchOps<'a> {
    pub fn new(repo: &'a Git2Repository) -> Self {
        BranchOps { repo }
    }

    /// Local branch tips. Branches that cannot be resolved are skipped.
    pub fn local_tips(&self) -> Result<Vec<BranchTip>> {
        let mut tips = Vec::new();
        for entry in self.repo.branches(Some(BranchType::Local))? {
            let resolved = entry.and_then(|(branch, _)| {
                let name = branch.name()?.unwrap_or("").to_string();
                let target = branch.get().peel_to_commit()?.id();
                Ok(BranchTip { name, target })
            });
            match resolved {
                Ok(tip) => tips.push(tip),
                Err(e) => warn!(error = %e, "skipping unresolvable branch"),
            }
        }
        Ok(tips)
    }

    /// Name of the checked-out branch, `None` when HEAD is detached or unborn
    pub fn active_branch(&self) -> Option<String> {
        let head = self.repo.head().ok()?;
        if head.is_branch() {
            head.shorthand().map(str::to_string)
        } else {
            None
        }
    }

    /// Stats for every local branch, sorted by name. `cap` bounds the
    /// commit count of each branch when set.
    pub fn branch_stats(&self, cap: Option<usize>) -> Result<Vec<BranchRecord>> {
        let active = self.active_branch();
        let mut records: Vec<BranchRecord> = self
            .local_tips()?
            .into_iter()
            .filter_map(|tip| match self.branch_record(&tip, active.as_deref(), cap) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(branch = %tip.name, error = %e, "skipping branch");
                    None
                }
            })
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    fn branch_record(
        &self,
        tip: &BranchTip,
        active: Option<&str>,
        cap: Option<usize>,
    ) -> Result<BranchRecord> {
        let traversal = |e| AnalyzerError::traversal(&tip.name, e);
        let commit = self.repo.find_commit(tip.target).map_err(traversal)?;

        let mut revwalk = self.repo.revwalk().map_err(traversal)?;
        revwalk.push(tip.target).map_err(traversal)?;
        let mut commits_count = 0;
        for oid in revwalk {
            oid.map_err(traversal)?;
            commits_count += 1;
            if cap.is_some_and(|cap| commits_count >= cap) {
                break;
            }
        }

        let last_author = commit.author().name().unwrap_or("Unknown").to_string();
        Ok(BranchRecord {
            name: tip.name.clone(),
            last_commit_hash: short_hash(&commit.id().to_string()),
            last_commit_timestamp: naive_time(commit.time()),
            last_author,
            commits_count,
            is_active: active == Some(tip.name.as_str()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{dt, ts, TestRepo};

    fn two_branches() -> TestRepo {
        let fixture = TestRepo::new();
        let c1 = fixture.commit("HEAD", &[("a.txt", "1\n")], "c1", "Alice", ts("2024-01-01 10:00:00"));
        fixture.commit("HEAD", &[("a.txt", "2\n")], "c2", "Alice", ts("2024-01-02 10:00:00"));
        fixture.branch("feature", c1);
        fixture.commit("refs/heads/feature", &[("f.txt", "f\n")], "f1", "Bob", ts("2024-01-03 10:00:00"));
        fixture
    }

    #[test]
    fn test_branch_stats() {
        let fixture = two_branches();
        let records = BranchOps::new(&fixture.repo).branch_stats(None).unwrap();

        assert_eq!(records.len(), 2);
        let feature = &records[0];
        assert_eq!(feature.name, "feature");
        assert_eq!(feature.commits_count, 2);
        assert_eq!(feature.last_author, "Bob");
        assert_eq!(feature.last_commit_timestamp, dt("2024-01-03 10:00:00"));
        assert!(!feature.is_active);

        let main = &records[1];
        assert_eq!(main.name, "main");
        assert_eq!(main.commits_count, 2);
        assert!(main.is_active);
        assert_eq!(records.iter().filter(|r| r.is_active).count(), 1);
    }

    #[test]
    fn test_commit_cap() {
        let fixture = two_branches();
        let records = BranchOps::new(&fixture.repo).branch_stats(Some(1)).unwrap();
        assert!(records.iter().all(|r| r.commits_count == 1));
    }

    #[test]
    fn test_detached_head_has_no_active_branch() {
        let fixture = two_branches();
        let head = fixture.repo.refname_to_id("HEAD").unwrap();
        fixture.repo.set_head_detached(head).unwrap();

        let records = BranchOps::new(&fixture.repo).branch_stats(None).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| !r.is_active));
    }

    #[test]
    fn test_empty_repository() {
        let fixture = TestRepo::new();
        let ops = BranchOps::new(&fixture.repo);
        assert!(ops.branch_stats(None).unwrap().is_empty());
        assert_eq!(ops.active_branch(), None);
    }
}
