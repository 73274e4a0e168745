use crate::error::Result;
use git2::{Commit, Delta, DiffFindOptions, Repository as Git2Repository};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatus {
    Added,
    Deleted,
    Modified,
    Renamed,
    Copied,
    TypeChange,
}

/// Line counts for one path touched by a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path after the change (the new name for renames)
    pub path: String,
    pub status: FileStatus,
    pub insertions: usize,
    pub deletions: usize,
}

/// Diff statistics of a single commit against its first parent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub files: Vec<FileChange>,
}

pub struct Diff<'repo> {
    repo: &'repo Git2Repository,
}

impl<'repo> Diff<'repo> {
    pub fn new(repo: &'repo Git2Repository) -> Self {
        Diff { repo }
    }

    /// Stats for `commit` against its first parent.
    ///
    /// Root commits, and shallow-boundary commits whose parent object was not
    /// fetched, are compared against the empty tree.
    pub fn for_commit(&self, commit: &Commit) -> Result<DiffStats> {
        let tree = commit.tree()?;
        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(parent.tree()?),
            Err(_) => None,
        };

        let mut diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
        diff.find_similar(Some(DiffFindOptions::new().renames(true)))?;

        let totals = diff.stats()?;
        let mut files = Vec::with_capacity(totals.files_changed());

        for (idx, delta) in diff.deltas().enumerate() {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();

            // Binary patches carry no line stats
            let (insertions, deletions) = match git2::Patch::from_diff(&diff, idx)? {
                Some(patch) => {
                    let (_, additions, removals) = patch.line_stats()?;
                    (additions, removals)
                }
                None => (0, 0),
            };

            files.push(FileChange {
                path,
                status: Self::convert_status(delta.status()),
                insertions,
                deletions,
            });
        }

        Ok(DiffStats {
            files_changed: totals.files_changed(),
            insertions: totals.insertions(),
            deletions: totals.deletions(),
            files,
        })
    }

    fn convert_status(status: Delta) -> FileStatus {
        match status {
            Delta::Added => FileStatus::Added,
            Delta::Deleted => FileStatus::Deleted,
            Delta::Renamed => FileStatus::Renamed,
            Delta::Copied => FileStatus::Copied,
            Delta::Typechange => FileStatus::TypeChange,
            _ => FileStatus::Modified,
        }
    }
}
