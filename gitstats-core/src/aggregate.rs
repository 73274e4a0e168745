//! Group-by-and-reduce passes over commit and merge records.
//!
//! Every function here is pure: it takes records already produced by the
//! walker and returns a fresh projection. Empty input gives empty output.

use crate::commit::CommitRecord;
use crate::merge::MergeRecord;
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;

/// Extension bucket for paths without one
pub const NO_EXTENSION: &str = "no_ext";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorStats {
    pub author: String,
    pub commits_count: usize,
    pub total_files_changed: usize,
    pub total_insertions: usize,
    pub total_deletions: usize,
    pub total_lines_changed: usize,
    pub first_commit: NaiveDateTime,
    pub last_commit: NaiveDateTime,
    pub active_days: i64,
    pub avg_lines_per_commit: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    pub file_path: String,
    pub modifications: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub total_changes: usize,
    pub authors_count: usize,
    pub file_extension: String,
}

/// Width of a time-series bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    Day,
    /// Monday through Sunday
    Week,
    Month,
}

impl Period {
    /// Start of the bucket containing `date`
    pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => date,
            Period::Week => {
                date - chrono::Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            Period::Month => date.with_day(1).unwrap_or(date),
        }
    }

    /// Start of the bucket after the one starting at `start`
    fn next(self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Period::Day => start.succ_opt(),
            Period::Week => start.checked_add_signed(chrono::Duration::days(7)),
            Period::Month => start.checked_add_months(Months::new(1)),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "d" | "day" | "daily" => Ok(Period::Day),
            "w" | "week" | "weekly" => Ok(Period::Week),
            "m" | "month" | "monthly" => Ok(Period::Month),
            other => Err(format!("unknown period '{}', expected day, week or month", other)),
        }
    }
}

/// Totals for one time bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub period_start: NaiveDateTime,
    pub commits: usize,
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub lines_changed: usize,
    pub unique_authors: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub total_commits: usize,
    pub active_authors: usize,
    pub total_lines_changed: usize,
    pub total_files_changed: usize,
    pub merge_commits: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMerges {
    pub date: NaiveDate,
    pub merges: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorWeekActivity {
    pub author: String,
    /// ISO week label such as `2024-W07`
    pub year_week: String,
    pub commits: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub weekday: Weekday,
    pub hour: u32,
    pub commits: usize,
}

/// How often one inferred source branch was merged into one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeFlow {
    pub source_branch: String,
    pub target_branch: String,
    pub merges: usize,
}

/// Per-author rollup, sorted by author name. Authors are grouped by exact
/// name; the same person under two names counts twice.
pub fn author_stats(commits: &[CommitRecord]) -> Vec<AuthorStats> {
    let mut groups: BTreeMap<&str, Vec<&CommitRecord>> = BTreeMap::new();
    for commit in commits {
        groups.entry(commit.author_name.as_str()).or_default().push(commit);
    }

    groups
        .into_iter()
        .filter_map(|(author, commits)| {
            let first_commit = commits.iter().map(|c| c.timestamp).min()?;
            let last_commit = commits.iter().map(|c| c.timestamp).max()?;
            let commits_count = commits.len();
            let total_lines_changed: usize = commits.iter().map(|c| c.lines_changed()).sum();

            Some(AuthorStats {
                author: author.to_string(),
                commits_count,
                total_files_changed: commits.iter().map(|c| c.files_changed).sum(),
                total_insertions: commits.iter().map(|c| c.insertions).sum(),
                total_deletions: commits.iter().map(|c| c.deletions).sum(),
                total_lines_changed,
                first_commit,
                last_commit,
                active_days: (last_commit - first_commit).num_days() + 1,
                avg_lines_per_commit: round2(total_lines_changed as f64 / commits_count as f64),
            })
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Per-path rollup, sorted by total changes (descending) then path
pub fn file_stats(commits: &[CommitRecord]) -> Vec<FileStats> {
    #[derive(Default)]
    struct Acc<'a> {
        modifications: usize,
        insertions: usize,
        deletions: usize,
        authors: HashSet<&'a str>,
    }

    let mut files: HashMap<&str, Acc> = HashMap::new();
    for commit in commits {
        for change in &commit.files {
            let acc = files.entry(change.path.as_str()).or_default();
            acc.modifications += 1;
            acc.insertions += change.insertions;
            acc.deletions += change.deletions;
            acc.authors.insert(commit.author_name.as_str());
        }
    }

    let mut stats: Vec<FileStats> = files
        .into_iter()
        .map(|(path, acc)| FileStats {
            file_path: path.to_string(),
            modifications: acc.modifications,
            insertions: acc.insertions,
            deletions: acc.deletions,
            total_changes: acc.insertions + acc.deletions,
            authors_count: acc.authors.len(),
            file_extension: file_extension(path),
        })
        .collect();

    stats.sort_by(|a, b| {
        b.total_changes
            .cmp(&a.total_changes)
            .then_with(|| a.file_path.cmp(&b.file_path))
    });
    stats
}

/// `.rs` style extension of the final path component, or [`NO_EXTENSION`]
pub fn file_extension(path: &str) -> String {
    Path::new(path)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_else(|| NO_EXTENSION.to_string())
}

/// Resample commits into fixed-width buckets.
///
/// Gaps are filled: every bucket from the first to the last non-empty one is
/// present, with zero totals where nothing was committed.
pub fn time_series(commits: &[CommitRecord], period: Period) -> Vec<TimeBucket> {
    #[derive(Default)]
    struct Acc<'a> {
        commits: usize,
        files_changed: usize,
        insertions: usize,
        deletions: usize,
        authors: HashSet<&'a str>,
    }

    let mut buckets: BTreeMap<NaiveDate, Acc> = BTreeMap::new();
    for commit in commits {
        let acc = buckets
            .entry(period.bucket_start(commit.timestamp.date()))
            .or_default();
        acc.commits += 1;
        acc.files_changed += commit.files_changed;
        acc.insertions += commit.insertions;
        acc.deletions += commit.deletions;
        acc.authors.insert(commit.author_name.as_str());
    }

    let (Some(first), Some(last)) = (
        buckets.keys().next().copied(),
        buckets.keys().next_back().copied(),
    ) else {
        return Vec::new();
    };

    let mut series = Vec::new();
    let mut cursor = Some(first);
    while let Some(start) = cursor.filter(|start| *start <= last) {
        let bucket = match buckets.get(&start) {
            Some(acc) => TimeBucket {
                period_start: start.and_time(chrono::NaiveTime::MIN),
                commits: acc.commits,
                files_changed: acc.files_changed,
                insertions: acc.insertions,
                deletions: acc.deletions,
                lines_changed: acc.insertions + acc.deletions,
                unique_authors: acc.authors.len(),
            },
            None => TimeBucket {
                period_start: start.and_time(chrono::NaiveTime::MIN),
                commits: 0,
                files_changed: 0,
                insertions: 0,
                deletions: 0,
                lines_changed: 0,
                unique_authors: 0,
            },
        };
        series.push(bucket);
        cursor = period.next(start);
    }
    series
}

pub fn summary(commits: &[CommitRecord]) -> RepoSummary {
    let authors: HashSet<&str> = commits.iter().map(|c| c.author_name.as_str()).collect();
    RepoSummary {
        total_commits: commits.len(),
        active_authors: authors.len(),
        total_lines_changed: commits.iter().map(|c| c.lines_changed()).sum(),
        total_files_changed: commits.iter().map(|c| c.files_changed).sum(),
        merge_commits: commits.iter().filter(|c| c.is_merge()).count(),
    }
}

/// Merges per calendar day, oldest first; days without merges are omitted
pub fn merge_frequency(merges: &[MergeRecord]) -> Vec<DailyMerges> {
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for merge in merges {
        *days.entry(merge.timestamp.date()).or_default() += 1;
    }
    days.into_iter()
        .map(|(date, merges)| DailyMerges { date, merges })
        .collect()
}

/// Commits per author per ISO week, sorted by author then week
pub fn author_activity(commits: &[CommitRecord]) -> Vec<AuthorWeekActivity> {
    let mut cells: BTreeMap<(&str, String), usize> = BTreeMap::new();
    for commit in commits {
        let week = commit.timestamp.date().iso_week();
        let label = format!("{}-W{:02}", week.year(), week.week());
        *cells.entry((commit.author_name.as_str(), label)).or_default() += 1;
    }
    cells
        .into_iter()
        .map(|((author, year_week), commits)| AuthorWeekActivity {
            author: author.to_string(),
            year_week,
            commits,
        })
        .collect()
}

/// Commits per weekday and hour of day. Only non-empty cells are returned,
/// Monday first.
pub fn commit_heatmap(commits: &[CommitRecord]) -> Vec<HeatmapCell> {
    let mut cells: BTreeMap<(u32, u32), usize> = BTreeMap::new();
    for commit in commits {
        let weekday = commit.timestamp.weekday().num_days_from_monday();
        *cells.entry((weekday, commit.timestamp.hour())).or_default() += 1;
    }
    cells
        .into_iter()
        .map(|((weekday, hour), commits)| HeatmapCell {
            weekday: weekday_from_monday(weekday),
            hour,
            commits,
        })
        .collect()
}

fn weekday_from_monday(days: u32) -> Weekday {
    match days {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}

/// Merge counts per (source, target) pair, most frequent first
pub fn merge_flows(merges: &[MergeRecord]) -> Vec<MergeFlow> {
    let mut flows: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for merge in merges {
        *flows
            .entry((merge.source_branch.as_str(), merge.target_branch.as_str()))
            .or_default() += 1;
    }

    let mut flows: Vec<MergeFlow> = flows
        .into_iter()
        .map(|((source, target), merges)| MergeFlow {
            source_branch: source.to_string(),
            target_branch: target.to_string(),
            merges,
        })
        .collect();
    // Stable sort keeps pairs with equal counts in name order
    flows.sort_by(|a, b| b.merges.cmp(&a.merges));
    flows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{FileChange, FileStatus};
    use crate::merge::{MergeClassifier, MergeType};
    use crate::testing::dt;
    use pretty_assertions::assert_eq;

    fn commit(author: &str, at: &str, changes: &[(&str, usize, usize)]) -> CommitRecord {
        let files: Vec<FileChange> = changes
            .iter()
            .map(|(path, insertions, deletions)| FileChange {
                path: path.to_string(),
                status: FileStatus::Modified,
                insertions: *insertions,
                deletions: *deletions,
            })
            .collect();
        CommitRecord {
            short_hash: "00000000".to_string(),
            full_hash: "0000000000000000000000000000000000000000".to_string(),
            author_name: author.to_string(),
            author_email: format!("{}@example.com", author.to_lowercase()),
            timestamp: dt(at),
            message: "change".to_string(),
            files_changed: files.len(),
            insertions: files.iter().map(|f| f.insertions).sum(),
            deletions: files.iter().map(|f| f.deletions).sum(),
            parent_hashes: vec!["1111111111111111111111111111111111111111".to_string()],
            files,
        }
    }

    fn merge(message: &str, at: &str) -> MergeRecord {
        let mut record = commit("Alice", at, &[]);
        record.message = message.to_string();
        record.parent_hashes.push("2222222222222222222222222222222222222222".to_string());
        MergeClassifier::classify(&record, Vec::new())
    }

    #[test]
    fn test_author_stats() {
        let commits = vec![
            commit("Bob", "2024-01-03 08:00:00", &[("a.rs", 3, 1)]),
            commit("Alice", "2024-01-05 10:00:00", &[("a.rs", 4, 0), ("b.rs", 1, 1)]),
            commit("Alice", "2024-01-01 10:00:00", &[("a.rs", 1, 0)]),
        ];

        let stats = author_stats(&commits);
        assert_eq!(stats.len(), 2);

        let alice = &stats[0];
        assert_eq!(alice.author, "Alice");
        assert_eq!(alice.commits_count, 2);
        assert_eq!(alice.total_files_changed, 3);
        assert_eq!(alice.total_insertions, 6);
        assert_eq!(alice.total_deletions, 1);
        assert_eq!(alice.total_lines_changed, 7);
        assert_eq!(alice.first_commit, dt("2024-01-01 10:00:00"));
        assert_eq!(alice.last_commit, dt("2024-01-05 10:00:00"));
        assert_eq!(alice.active_days, 5);
        assert_eq!(alice.avg_lines_per_commit, 3.5);

        let bob = &stats[1];
        assert_eq!(bob.active_days, 1);
        assert_eq!(bob.avg_lines_per_commit, 4.0);
    }

    #[test]
    fn test_average_rounds_to_two_places() {
        let commits = vec![
            commit("Carol", "2024-01-01 10:00:00", &[("a", 1, 0)]),
            commit("Carol", "2024-01-01 11:00:00", &[("a", 1, 0)]),
            commit("Carol", "2024-01-01 12:00:00", &[("a", 0, 0)]),
        ];
        assert_eq!(author_stats(&commits)[0].avg_lines_per_commit, 0.67);
    }

    #[test]
    fn test_file_stats() {
        let commits = vec![
            commit("Alice", "2024-01-01 10:00:00", &[("src/main.rs", 10, 2), ("Makefile", 1, 0)]),
            commit("Bob", "2024-01-02 10:00:00", &[("src/main.rs", 3, 3)]),
            commit("Alice", "2024-01-03 10:00:00", &[("src/main.rs", 1, 0), (".gitignore", 1, 0)]),
        ];

        let stats = file_stats(&commits);
        assert_eq!(stats.len(), 3);
        assert_eq!(
            stats[0],
            FileStats {
                file_path: "src/main.rs".to_string(),
                modifications: 3,
                insertions: 14,
                deletions: 5,
                total_changes: 19,
                authors_count: 2,
                file_extension: ".rs".to_string(),
            }
        );
        // Ties on total changes fall back to path order
        assert_eq!(stats[1].file_path, ".gitignore");
        assert_eq!(stats[1].file_extension, NO_EXTENSION);
        assert_eq!(stats[2].file_path, "Makefile");
        assert_eq!(stats[2].file_extension, NO_EXTENSION);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
        assert_eq!(file_extension("dir.d/README"), NO_EXTENSION);
    }

    #[test]
    fn test_daily_series_fills_gaps() {
        let commits = vec![
            commit("Alice", "2024-01-03 18:00:00", &[("a", 2, 1)]),
            commit("Bob", "2024-01-01 09:00:00", &[("a", 1, 0)]),
            commit("Alice", "2024-01-01 12:00:00", &[("b", 1, 1)]),
        ];

        let series = time_series(&commits, Period::Day);
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].period_start, dt("2024-01-01 00:00:00"));
        assert_eq!(series[0].commits, 2);
        assert_eq!(series[0].unique_authors, 2);
        assert_eq!(series[0].lines_changed, 3);
        assert_eq!(series[1].period_start, dt("2024-01-02 00:00:00"));
        assert_eq!(series[1].commits, 0);
        assert_eq!(series[1].unique_authors, 0);
        assert_eq!(series[2].insertions, 2);
        assert_eq!(series[2].deletions, 1);
    }

    #[test]
    fn test_weekly_and_monthly_buckets() {
        let commits = vec![
            // Wednesday and Sunday of the same ISO week
            commit("Alice", "2024-01-03 10:00:00", &[("a", 1, 0)]),
            commit("Alice", "2024-01-07 10:00:00", &[("a", 1, 0)]),
            commit("Alice", "2024-03-15 10:00:00", &[("a", 1, 0)]),
        ];

        let weekly = time_series(&commits, Period::Week);
        assert_eq!(weekly[0].period_start, dt("2024-01-01 00:00:00"));
        assert_eq!(weekly[0].commits, 2);
        assert_eq!(weekly.last().unwrap().period_start, dt("2024-03-11 00:00:00"));
        assert_eq!(weekly.iter().map(|b| b.commits).sum::<usize>(), 3);

        let monthly = time_series(&commits, Period::Month);
        let starts: Vec<NaiveDateTime> = monthly.iter().map(|b| b.period_start).collect();
        assert_eq!(
            starts,
            vec![
                dt("2024-01-01 00:00:00"),
                dt("2024-02-01 00:00:00"),
                dt("2024-03-01 00:00:00"),
            ]
        );
        assert_eq!(monthly[1].commits, 0);
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("D".parse::<Period>(), Ok(Period::Day));
        assert_eq!("weekly".parse::<Period>(), Ok(Period::Week));
        assert_eq!("M".parse::<Period>(), Ok(Period::Month));
        assert!("fortnight".parse::<Period>().is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(author_stats(&[]).is_empty());
        assert!(file_stats(&[]).is_empty());
        assert!(time_series(&[], Period::Week).is_empty());
        assert_eq!(summary(&[]), RepoSummary::default());
        assert!(merge_frequency(&[]).is_empty());
        assert!(author_activity(&[]).is_empty());
        assert!(commit_heatmap(&[]).is_empty());
        assert!(merge_flows(&[]).is_empty());
    }

    #[test]
    fn test_summary() {
        let mut merge_commit = commit("Bob", "2024-01-02 10:00:00", &[]);
        merge_commit.parent_hashes.push("2222222222222222222222222222222222222222".to_string());
        let commits = vec![
            commit("Alice", "2024-01-01 10:00:00", &[("a", 3, 1), ("b", 1, 0)]),
            merge_commit,
        ];
        assert_eq!(
            summary(&commits),
            RepoSummary {
                total_commits: 2,
                active_authors: 2,
                total_lines_changed: 5,
                total_files_changed: 2,
                merge_commits: 1,
            }
        );
    }

    #[test]
    fn test_activity_and_heatmap() {
        let commits = vec![
            commit("Alice", "2024-01-01 09:30:00", &[]),
            commit("Alice", "2024-01-01 09:45:00", &[]),
            commit("Bob", "2024-02-14 17:00:00", &[]),
        ];

        let activity = author_activity(&commits);
        assert_eq!(
            activity,
            vec![
                AuthorWeekActivity {
                    author: "Alice".to_string(),
                    year_week: "2024-W01".to_string(),
                    commits: 2,
                },
                AuthorWeekActivity {
                    author: "Bob".to_string(),
                    year_week: "2024-W07".to_string(),
                    commits: 1,
                },
            ]
        );

        let heatmap = commit_heatmap(&commits);
        assert_eq!(
            heatmap,
            vec![
                HeatmapCell { weekday: Weekday::Mon, hour: 9, commits: 2 },
                HeatmapCell { weekday: Weekday::Wed, hour: 17, commits: 1 },
            ]
        );
    }

    #[test]
    fn test_merge_frequency_and_flows() {
        let merges = vec![
            merge("Merge branch 'feature-a' into develop", "2024-01-02 10:00:00"),
            merge("Merge branch 'feature-a' into develop", "2024-01-02 15:00:00"),
            merge("Merge pull request #3 from hotfix/crash", "2024-01-01 10:00:00"),
            merge("Merge foo bar baz", "2024-01-04 10:00:00"),
        ];
        assert_eq!(merges[2].merge_type, MergeType::PullRequest);

        let frequency = merge_frequency(&merges);
        assert_eq!(frequency.len(), 3);
        assert_eq!(frequency[0].date, dt("2024-01-01 00:00:00").date());
        assert_eq!(frequency[1].merges, 2);

        let flows = merge_flows(&merges);
        assert_eq!(flows[0].source_branch, "feature-a");
        assert_eq!(flows[0].target_branch, "develop");
        assert_eq!(flows[0].merges, 2);
        assert_eq!(flows.len(), 3);
        assert!(flows
            .iter()
            .any(|f| f.source_branch == "unknown" && f.target_branch == "unknown"));
    }
}
