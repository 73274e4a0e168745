use crate::error::{AnalyzerError, Result};
use git2::{
    build::RepoBuilder, Cred, Direction, FetchOptions, Remote, RemoteCallbacks,
    Repository as Git2Repository,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// A configured remote of the analyzed repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteInfo {
    pub name: String,
    pub url: String,
}

/// Read-only remote queries for a repository
pub struct RemoteOps<'a> {
    repo: &'a Git2Repository,
}

impl<'a> RemoteOps<'a> {
    pub fn new(repo: &'a Git2Repository) -> Self {
        RemoteOps { repo }
    }

    /// List all remotes; an unreadable remote is left out
    pub fn list_remotes(&self) -> Result<Vec<RemoteInfo>> {
        let remotes = self.repo.remotes()?;
        let mut result = Vec::new();

        for remote_name in remotes.iter().flatten() {
            if let Ok(remote) = self.repo.find_remote(remote_name) {
                result.push(RemoteInfo {
                    name: remote_name.to_string(),
                    url: remote.url().unwrap_or("").to_string(),
                });
            }
        }

        Ok(result)
    }
}

/// Clone `url` into `dest`, fetching only the default branch.
///
/// Network sources are fetched down to `depth` commits. Local sources
/// (existing paths and `file://` URLs) are cloned in full, since the local
/// transport cannot fetch shallow. `dest` is owned by the caller, which
/// removes it when this fails.
pub fn clone_into(url: &str, dest: &Path, depth: u32) -> Result<Git2Repository> {
    let transport = |source| AnalyzerError::RemoteTransport {
        url: url.to_string(),
        source,
    };

    let branch = default_branch(url).map_err(transport)?;
    debug!(url, ?branch, "resolved remote default branch");

    let depth = (!is_local_source(url)).then_some(depth);
    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options(depth));

    if let Some(branch) = branch {
        let refspec = format!("+refs/heads/{0}:refs/remotes/origin/{0}", branch);
        builder.branch(&branch);
        builder.remote_create(move |repo, name, url| repo.remote_with_fetch(name, url, &refspec));
    }

    info!(url, ?depth, dest = %dest.display(), "cloning remote repository");
    builder.clone(url, dest).map_err(transport)
}

/// Sources served by the local transport
pub fn is_local_source(url: &str) -> bool {
    url.starts_with("file://") || Path::new(url).exists()
}

/// Ask the remote which branch its HEAD points at
fn default_branch(url: &str) -> std::result::Result<Option<String>, git2::Error> {
    let mut remote = Remote::create_detached(url)?;
    let connection = remote.connect_auth(Direction::Fetch, Some(credential_callbacks()), None)?;

    // Some transports do not advertise HEAD; fall back to a plain clone
    let branch = connection
        .default_branch()
        .ok()
        .and_then(|buf| buf.as_str().map(str::to_string))
        .and_then(|name| name.strip_prefix("refs/heads/").map(str::to_string));
    Ok(branch)
}

fn fetch_options(depth: Option<u32>) -> FetchOptions<'static> {
    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(credential_callbacks());
    if let Some(depth) = depth {
        fetch_options.depth(i32::try_from(depth).unwrap_or(i32::MAX));
    }
    fetch_options
}

fn credential_callbacks() -> RemoteCallbacks<'static> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, _allowed_types| {
        let username = username_from_url.unwrap_or("git");

        if let Ok(home) = std::env::var("HOME") {
            let ssh_dir = Path::new(&home).join(".ssh");
            for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                let key_path = ssh_dir.join(key);
                if key_path.exists() {
                    return Cred::ssh_key(username, None, &key_path, None);
                }
            }
        }

        Cred::ssh_key_from_agent(username)
    });
    callbacks
}
