//! Commit history statistics for git repositories.
//!
//! [`GitAnalyzer`] opens a local path or a remote identifier and answers
//! statistics queries over its history: commits, merges, authors, files,
//! branches, time series and the cross-branch commit graph.

pub mod analyzer;

pub use analyzer::{GitAnalyzer, DEFAULT_REFERENCE};
pub use gitstats_core::{AnalyzerConfig, AnalyzerError, Period};
pub use graph::BranchGraph;
