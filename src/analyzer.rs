use chrono::NaiveDateTime;
use gitstats_core::{
    aggregate, AnalyzerConfig, AuthorStats, AuthorWeekActivity, BranchRecord, CommitRecord,
    DailyMerges, FileStats, HeatmapCell, MergeClassifier, MergeFlow, MergeRecord, Period,
    RepoInfo, RepoSummary, Repository, Result, TimeBucket, WalkOptions,
};
use graph::{BranchGraph, GraphBuilder};
use std::collections::HashSet;
use tracing::warn;

/// Revision analyzed by queries that take no branch argument
pub const DEFAULT_REFERENCE: &str = "HEAD";

/// Query surface over one repository.
///
/// Every query recomputes its answer from the repository as it is now; the
/// analyzer holds no results between calls. Queries that find nothing return
/// empty collections. Branches and commits that cannot be read are skipped.
pub struct GitAnalyzer {
    repo: Repository,
    config: AnalyzerConfig,
}

impl GitAnalyzer {
    /// Open a local path or remote identifier with default settings
    pub fn open(input: &str) -> Result<Self> {
        Self::open_with_config(input, AnalyzerConfig::default())
    }

    pub fn open_with_config(input: &str, config: AnalyzerConfig) -> Result<Self> {
        let repo = Repository::open(input, &config)?;
        Ok(Self { repo, config })
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn repo_info(&self) -> Result<RepoInfo> {
        self.repo.info()
    }

    /// Commits reachable from `branch` within the bounds, newest first
    pub fn commit_stats(
        &self,
        since: Option<NaiveDateTime>,
        until: Option<NaiveDateTime>,
        branch: &str,
    ) -> Vec<CommitRecord> {
        let opts = WalkOptions::new(branch).between(since, until);
        self.repo.walker().walk_or_empty(&opts)
    }

    /// Merge commits on `HEAD` within the bounds, with inferred direction
    pub fn merge_stats(
        &self,
        since: Option<NaiveDateTime>,
        until: Option<NaiveDateTime>,
    ) -> Vec<MergeRecord> {
        let commits = self.commit_stats(since, until, DEFAULT_REFERENCE);
        self.classify_merges(commits.iter().filter(|c| c.is_merge()))
    }

    pub fn author_stats(
        &self,
        since: Option<NaiveDateTime>,
        until: Option<NaiveDateTime>,
    ) -> Vec<AuthorStats> {
        aggregate::author_stats(&self.commit_stats(since, until, DEFAULT_REFERENCE))
    }

    pub fn file_stats(
        &self,
        since: Option<NaiveDateTime>,
        until: Option<NaiveDateTime>,
    ) -> Vec<FileStats> {
        aggregate::file_stats(&self.commit_stats(since, until, DEFAULT_REFERENCE))
    }

    /// Local branches with tip, size and checkout state
    pub fn branch_stats(&self) -> Vec<BranchRecord> {
        self.repo
            .branches()
            .branch_stats(self.config.branch_commit_cap)
            .unwrap_or_else(|e| {
                warn!(error = %e, "cannot enumerate branches");
                Vec::new()
            })
    }

    pub fn time_series_stats(
        &self,
        period: Period,
        since: Option<NaiveDateTime>,
        until: Option<NaiveDateTime>,
    ) -> Vec<TimeBucket> {
        aggregate::time_series(&self.commit_stats(since, until, DEFAULT_REFERENCE), period)
    }

    pub fn branch_graph_data(&self) -> BranchGraph {
        GraphBuilder::new(self.repo.git(), self.config.graph_branch_cap)
            .message_width(self.config.message_width)
            .build()
    }

    /// Merge commits reachable from any local branch within the per-branch
    /// cap, newest first
    pub fn merge_direction_history(&self) -> Vec<MergeRecord> {
        let tips = match self.repo.branches().local_tips() {
            Ok(tips) => tips,
            Err(e) => {
                warn!(error = %e, "cannot enumerate branches");
                return Vec::new();
            }
        };

        let walker = self.repo.walker();
        let mut seen = HashSet::new();
        let mut merges = Vec::new();

        for tip in tips {
            let opts = WalkOptions::new(tip.target.to_string()).limit(self.config.merge_history_cap);
            let ids = match walker.commit_ids(&opts) {
                Ok(ids) => ids,
                Err(e) => {
                    warn!(branch = %tip.name, error = %e, "skipping branch");
                    continue;
                }
            };

            for oid in ids {
                if !seen.insert(oid) {
                    continue;
                }
                let is_merge = self
                    .repo
                    .git()
                    .find_commit(oid)
                    .map(|c| c.parent_count() > 1)
                    .unwrap_or(false);
                if !is_merge {
                    continue;
                }
                match walker.record(oid) {
                    Ok(record) => merges.push(record),
                    Err(e) => warn!(commit = %oid, error = %e, "skipping merge commit"),
                }
            }
        }

        let mut history = self.classify_merges(merges.iter());
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        history
    }

    /// How often each inferred source branch went into each target
    pub fn merge_flows(&self) -> Vec<MergeFlow> {
        aggregate::merge_flows(&self.merge_direction_history())
    }

    pub fn summary(
        &self,
        since: Option<NaiveDateTime>,
        until: Option<NaiveDateTime>,
    ) -> RepoSummary {
        aggregate::summary(&self.commit_stats(since, until, DEFAULT_REFERENCE))
    }

    pub fn merge_frequency(
        &self,
        since: Option<NaiveDateTime>,
        until: Option<NaiveDateTime>,
    ) -> Vec<DailyMerges> {
        aggregate::merge_frequency(&self.merge_stats(since, until))
    }

    pub fn author_activity(
        &self,
        since: Option<NaiveDateTime>,
        until: Option<NaiveDateTime>,
    ) -> Vec<AuthorWeekActivity> {
        aggregate::author_activity(&self.commit_stats(since, until, DEFAULT_REFERENCE))
    }

    pub fn commit_heatmap(
        &self,
        since: Option<NaiveDateTime>,
        until: Option<NaiveDateTime>,
    ) -> Vec<HeatmapCell> {
        aggregate::commit_heatmap(&self.commit_stats(since, until, DEFAULT_REFERENCE))
    }

    /// Release the repository, removing an ephemeral clone
    pub fn close(self) -> Result<()> {
        self.repo.close()
    }

    fn classify_merges<'a>(&self, merges: impl Iterator<Item = &'a CommitRecord>) -> Vec<MergeRecord> {
        let walker = self.repo.walker();
        merges
            .map(|commit| {
                let parents = walker.parent_summaries(commit, self.config.message_width);
                MergeClassifier::classify(commit, parents)
            })
            .collect()
    }
}
