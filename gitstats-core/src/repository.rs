use crate::branch::BranchOps;
use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, Result};
use crate::remote::{self, RemoteInfo, RemoteOps};
use crate::source::RepoSource;
use crate::walker::CommitWalker;
use git2::{BranchType, ErrorCode, Repository as Git2Repository};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Reported as the current branch when HEAD points straight at a commit
pub const DETACHED_HEAD: &str = "HEAD (detached)";

/// Reported when the current branch cannot be determined
pub const UNKNOWN_HEAD: &str = "unknown";

/// Basic metadata about an opened repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub path: PathBuf,
    pub current_branch: String,
    pub total_branches: usize,
    pub remotes: Vec<RemoteInfo>,
    /// Identifier the user supplied, for repositories opened from a remote
    pub remote_source: Option<String>,
    /// Ephemeral clone location, for repositories opened from a remote
    pub clone_path: Option<PathBuf>,
}

enum Origin {
    Local,
    Remote { input: String, checkout: TempDir },
}

/// Read-only handle on a repository opened from a path or a remote.
///
/// A remote is shallow-cloned into a temporary directory that lives exactly
/// as long as the handle: it is removed on drop, or by [`Repository::close`]
/// when the caller wants to see cleanup errors.
pub struct Repository {
    path: PathBuf,
    // Declared before `origin`: the libgit2 handle closes before its
    // checkout directory is deleted.
    git_repo: Git2Repository,
    origin: Origin,
}

impl Repository {
    /// Open a local path or clone a remote identifier
    pub fn open(input: &str, config: &AnalyzerConfig) -> Result<Self> {
        match RepoSource::classify(input) {
            RepoSource::Local(path) => Self::open_local(&path),
            RepoSource::Remote(url) => Self::open_remote(input.trim(), &url, config),
        }
    }

    /// Open an existing repository rooted at `path`
    pub fn open_local<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let input = path.display().to_string();

        if !path.exists() {
            return Err(AnalyzerError::invalid_repository(&input, "path does not exist"));
        }
        if !path.is_dir() {
            return Err(AnalyzerError::invalid_repository(&input, "not a directory"));
        }

        let git_repo = Git2Repository::open(path).map_err(|e| {
            AnalyzerError::invalid_repository(&input, format!("not a git repository: {}", e.message()))
        })?;

        let root = git_repo.workdir().unwrap_or_else(|| git_repo.path());
        let path = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        debug!(path = %path.display(), "opened repository");

        Ok(Repository {
            path,
            git_repo,
            origin: Origin::Local,
        })
    }

    fn open_remote(input: &str, url: &str, config: &AnalyzerConfig) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("gitstats-clone-");
        let checkout = match &config.clone_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };

        // On failure `checkout` is dropped here, removing any partial clone
        let git_repo = remote::clone_into(url, checkout.path(), config.clone_depth)?;

        Ok(Repository {
            path: checkout.path().to_path_buf(),
            git_repo,
            origin: Origin::Remote {
                input: input.to_string(),
                checkout,
            },
        })
    }

    /// Absolute path of the working tree (or of the git dir for bare repos)
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git(&self) -> &Git2Repository {
        &self.git_repo
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.origin, Origin::Remote { .. })
    }

    pub fn clone_path(&self) -> Option<&Path> {
        match &self.origin {
            Origin::Remote { checkout, .. } => Some(checkout.path()),
            Origin::Local => None,
        }
    }

    pub fn walker(&self) -> CommitWalker<'_> {
        CommitWalker::new(&self.git_repo)
    }

    pub fn branches(&self) -> BranchOps<'_> {
        BranchOps::new(&self.git_repo)
    }

    /// Current branch name, [`DETACHED_HEAD`], or [`UNKNOWN_HEAD`]
    pub fn current_branch(&self) -> String {
        match self.git_repo.head() {
            Ok(head) if head.is_branch() => head.shorthand().unwrap_or(UNKNOWN_HEAD).to_string(),
            Ok(_) => DETACHED_HEAD.to_string(),
            // A fresh repository still names its first branch through HEAD
            Err(e) if e.code() == ErrorCode::UnbornBranch => self
                .git_repo
                .find_reference("HEAD")
                .ok()
                .and_then(|head| head.symbolic_target().map(str::to_string))
                .and_then(|target| target.strip_prefix("refs/heads/").map(str::to_string))
                .unwrap_or_else(|| UNKNOWN_HEAD.to_string()),
            Err(_) => UNKNOWN_HEAD.to_string(),
        }
    }

    pub fn info(&self) -> Result<RepoInfo> {
        let total_branches = self
            .git_repo
            .branches(Some(BranchType::Local))?
            .filter(|b| b.is_ok())
            .count();

        let (remote_source, clone_path) = match &self.origin {
            Origin::Remote { input, checkout } => {
                (Some(input.clone()), Some(checkout.path().to_path_buf()))
            }
            Origin::Local => (None, None),
        };

        Ok(RepoInfo {
            path: self.path.clone(),
            current_branch: self.current_branch(),
            total_branches,
            remotes: RemoteOps::new(&self.git_repo).list_remotes()?,
            remote_source,
            clone_path,
        })
    }

    /// Release the handle, deleting the ephemeral clone if there is one
    pub fn close(self) -> Result<()> {
        let Repository { git_repo, origin, .. } = self;
        drop(git_repo);
        if let Origin::Remote { checkout, .. } = origin {
            checkout.close()?;
        }
        Ok(())
    }
}
