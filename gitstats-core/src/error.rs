use thiserror::Error;

/// Failures surfaced by the history-mining engine.
///
/// Only repository-level problems reach the caller. Per-branch and per-commit
/// failures are reported as [`AnalyzerError::Traversal`] by the helpers that
/// hit them and are then skipped by the aggregating query.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("invalid repository '{input}': {reason}")]
    InvalidRepository { input: String, reason: String },

    #[error("failed to clone {url}: {source}")]
    RemoteTransport {
        url: String,
        #[source]
        source: git2::Error,
    },

    #[error("cannot walk '{reference}': {source}")]
    Traversal {
        reference: String,
        #[source]
        source: git2::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnalyzerError {
    pub(crate) fn invalid_repository(input: &str, reason: impl Into<String>) -> Self {
        AnalyzerError::InvalidRepository {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn traversal(reference: &str, source: git2::Error) -> Self {
        AnalyzerError::Traversal {
            reference: reference.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
