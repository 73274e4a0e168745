//! Scratch repositories with fixed signatures and timestamps.

use chrono::NaiveDateTime;
use git2::{Oid, Repository as Git2Repository, RepositoryInitOptions, Signature, Time};
use std::path::Path;
use tempfile::TempDir;

pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Git2Repository,
}

impl TestRepo {
    /// Empty repository whose HEAD points at `main`
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Git2Repository::init_opts(dir.path(), &opts).unwrap();
        TestRepo { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Commit `files` on top of the current tip of `refname` (a root commit
    /// when the ref does not resolve yet) and advance the ref.
    pub fn commit(
        &self,
        refname: &str,
        files: &[(&str, &str)],
        message: &str,
        author: &str,
        time: i64,
    ) -> Oid {
        let parents: Vec<Oid> = self.repo.refname_to_id(refname).into_iter().collect();
        self.commit_with_parents(Some(refname), &parents, files, message, author, time)
    }

    /// Merge commit on `refname` with `other` as second parent
    pub fn merge(&self, refname: &str, other: Oid, message: &str, author: &str, time: i64) -> Oid {
        let tip = self.repo.refname_to_id(refname).unwrap();
        self.commit_with_parents(Some(refname), &[tip, other], &[], message, author, time)
    }

    pub fn commit_with_parents(
        &self,
        update_ref: Option<&str>,
        parents: &[Oid],
        files: &[(&str, &str)],
        message: &str,
        author: &str,
        time: i64,
    ) -> Oid {
        let parent_commits: Vec<git2::Commit> = parents
            .iter()
            .map(|id| self.repo.find_commit(*id).unwrap())
            .collect();
        let base_tree = parent_commits.first().map(|c| c.tree().unwrap());

        let mut builder = self.repo.treebuilder(base_tree.as_ref()).unwrap();
        for (name, content) in files {
            let blob = self.repo.blob(content.as_bytes()).unwrap();
            builder.insert(name, blob, 0o100644).unwrap();
        }
        let tree = self.repo.find_tree(builder.write().unwrap()).unwrap();

        let email = format!("{}@example.com", author.to_lowercase());
        let sig = Signature::new(author, &email, &Time::new(time, 0)).unwrap();
        let parent_refs: Vec<&git2::Commit> = parent_commits.iter().collect();
        self.repo
            .commit(update_ref, &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    pub fn branch(&self, name: &str, target: Oid) {
        let commit = self.repo.find_commit(target).unwrap();
        self.repo.branch(name, &commit, false).unwrap();
    }
}

/// Epoch seconds of a `YYYY-MM-DD HH:MM:SS` UTC timestamp
pub fn ts(s: &str) -> i64 {
    dt(s).and_utc().timestamp()
}

pub fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}
