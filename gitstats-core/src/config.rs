use crate::error::{AnalyzerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Width that commit messages are cut to for display
pub const DEFAULT_MESSAGE_WIDTH: usize = 50;

/// Traversal limits and clone settings shared by every query.
///
/// All fields have defaults, so an empty TOML document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Commits walked per branch when building the branch graph
    pub graph_branch_cap: usize,
    /// Commits walked per branch when collecting merge direction history
    pub merge_history_cap: usize,
    /// Optional ceiling for `commits_count` in branch stats
    pub branch_commit_cap: Option<usize>,
    /// Depth of the shallow clone made for remote inputs
    pub clone_depth: u32,
    /// Parent directory for ephemeral clones; system temp dir when unset
    pub clone_root: Option<PathBuf>,
    /// Width that graph node and parent summary messages are cut to
    pub message_width: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            graph_branch_cap: 50,
            merge_history_cap: 100,
            branch_commit_cap: None,
            clone_depth: 100,
            clone_root: None,
            message_width: DEFAULT_MESSAGE_WIDTH,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AnalyzerError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AnalyzerConfig =
            toml::from_str(content).map_err(|e| AnalyzerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.clone_depth == 0 {
            return Err(AnalyzerError::Config("clone_depth must be at least 1".into()));
        }
        if self.graph_branch_cap == 0
            || self.merge_history_cap == 0
            || self.branch_commit_cap == Some(0)
        {
            return Err(AnalyzerError::Config(
                "per-branch caps must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
