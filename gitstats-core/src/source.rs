//! Classification of repository identifiers into local paths and remotes.
//!
//! The classifier is a substring heuristic, not a URL validator. A local
//! directory literally named `a/b` is classified as the remote `a/b`; that
//! ambiguity is accepted.

/// Substrings that mark an input as remote
const REMOTE_MARKERS: &[&str] = &[
    "http://",
    "https://",
    "git://",
    "ssh://",
    "git@",
    ".git",
    "github.com",
    "gitlab.com",
    "bitbucket.org",
];

const URL_SCHEMES: &[&str] = &["http://", "https://", "git://", "ssh://"];

/// First segment of the `m/owner/repo` shorthand
pub const SHORTHAND_PREFIX: &str = "m";

/// Where a repository identifier points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSource {
    Local(String),
    /// Normalized clone URL
    Remote(String),
}

impl RepoSource {
    pub fn classify(input: &str) -> Self {
        let input = input.trim();
        if is_remote(input) {
            RepoSource::Remote(normalize_remote_url(input))
        } else {
            RepoSource::Local(input.to_string())
        }
    }
}

/// Heuristic remote detection
pub fn is_remote(input: &str) -> bool {
    let input = input.trim();
    REMOTE_MARKERS.iter().any(|m| input.contains(m)) || is_owner_repo(input)
}

/// `owner/repo` or `prefix/owner/repo`, first segment without a dot
fn is_owner_repo(input: &str) -> bool {
    if input.starts_with('/') {
        return false;
    }
    let segments: Vec<&str> = input.split('/').collect();
    (2..=3).contains(&segments.len())
        && segments.iter().all(|s| !s.is_empty())
        && !segments[0].contains('.')
}

/// Rewrite shorthands into clone URLs. Full URLs and `git@` addresses are
/// returned unchanged, so the function is idempotent.
pub fn normalize_remote_url(input: &str) -> String {
    let input = input.trim();
    if URL_SCHEMES.iter().any(|s| input.starts_with(s)) || input.starts_with("git@") {
        return input.to_string();
    }
    if input.starts_with('/') {
        return input.to_string();
    }

    let segments: Vec<&str> = input.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return input.to_string();
    }
    match segments.as_slice() {
        [prefix, owner, repo] if *prefix == SHORTHAND_PREFIX => {
            hosted_url("github.com", owner, repo)
        }
        [host, owner, repo] if host.contains('.') => hosted_url(host, owner, repo),
        [owner, repo] if !owner.contains('.') => hosted_url("github.com", owner, repo),
        _ => input.to_string(),
    }
}

fn hosted_url(host: &str, owner: &str, repo: &str) -> String {
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    format!("https://{}/{}/{}.git", host, owner, repo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_repo_shorthand() {
        assert_eq!(
            normalize_remote_url("owner/repo"),
            "https://github.com/owner/repo.git"
        );
        assert_eq!(
            normalize_remote_url("owner/repo.git"),
            "https://github.com/owner/repo.git"
        );
    }

    #[test]
    fn test_prefixed_shorthand() {
        assert_eq!(
            normalize_remote_url("m/owner/repo"),
            "https://github.com/owner/repo.git"
        );
    }

    #[test]
    fn test_host_path() {
        assert_eq!(
            normalize_remote_url("gitlab.com/group/project"),
            "https://gitlab.com/group/project.git"
        );
    }

    #[test]
    fn test_urls_pass_through() {
        for url in [
            "https://github.com/rust-lang/rust.git",
            "http://example.org/repo",
            "git://example.org/repo.git",
            "ssh://git@example.org/repo.git",
            "git@github.com:owner/repo.git",
        ] {
            assert_eq!(normalize_remote_url(url), url);
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in [
            "owner/repo",
            "m/owner/repo",
            "owner/repo.git",
            "gitlab.com/a/b",
            "git@github.com:owner/repo",
            "https://github.com/owner/repo",
            "/srv/mirror.git",
            "x/y/z",
        ] {
            let once = normalize_remote_url(input);
            assert_eq!(normalize_remote_url(&once), once, "input {}", input);
        }
    }

    #[test]
    fn test_remote_detection() {
        assert!(is_remote("https://github.com/owner/repo"));
        assert!(is_remote("git@gitlab.com:owner/repo"));
        assert!(is_remote("owner/repo"));
        assert!(is_remote("m/owner/repo"));
        assert!(is_remote("bitbucket.org/team/repo"));
        assert!(is_remote("/srv/mirror.git"));

        assert!(!is_remote("."));
        assert!(!is_remote("/home/user/project"));
        assert!(!is_remote("./project/sub"));
        assert!(!is_remote("a/b/c/d"));
        assert!(!is_remote("project"));
    }

    #[test]
    fn test_nested_relative_path_is_ambiguous() {
        // Known limitation: a relative local path with two segments reads as owner/repo
        assert_eq!(
            RepoSource::classify("projects/app"),
            RepoSource::Remote("https://github.com/projects/app.git".to_string())
        );
    }

    #[test]
    fn test_classify_local() {
        assert_eq!(
            RepoSource::classify(" /tmp/work "),
            RepoSource::Local("/tmp/work".to_string())
        );
    }
}
