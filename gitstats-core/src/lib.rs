pub mod aggregate;
pub mod branch;
pub mod commit;
pub mod config;
pub mod diff;
pub mod error;
pub mod merge;
pub mod remote;
pub mod repository;
pub mod source;
pub mod walker;

#[cfg(test)]
mod testing;

pub use aggregate::{
    AuthorStats, AuthorWeekActivity, DailyMerges, FileStats, HeatmapCell, MergeFlow, Period,
    RepoSummary, TimeBucket,
};
pub use branch::{BranchOps, BranchRecord, BranchTip};
pub use commit::{CommitRecord, SHORT_HASH_LEN};
pub use config::{AnalyzerConfig, DEFAULT_MESSAGE_WIDTH};
pub use diff::{Diff, DiffStats, FileChange, FileStatus};
pub use error::{AnalyzerError, Result};
pub use merge::{
    MergeClassifier, MergeDirection, MergeRecord, MergeType, ParentSummary,
    DEFAULT_TARGET_BRANCH, UNKNOWN_BRANCH,
};
pub use remote::{RemoteInfo, RemoteOps};
pub use repository::{RepoInfo, Repository, DETACHED_HEAD};
pub use source::{is_remote, normalize_remote_url, RepoSource};
pub use walker::{CommitWalker, WalkOptions};
