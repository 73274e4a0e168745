use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use gitstats::{AnalyzerConfig, GitAnalyzer, Period, DEFAULT_REFERENCE};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "gitstats")]
#[command(about = "Commit history statistics for local and remote git repositories", long_about = None)]
struct Cli {
    /// Local path, URL or owner/repo shorthand
    #[arg(short, long, global = true, default_value = ".")]
    repo: String,
    /// TOML file with traversal limits and clone settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Only commits on or after this day (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_day)]
    since: Option<NaiveDate>,
    /// Only commits on or before this day (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_day)]
    until: Option<NaiveDate>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show repository information
    Info,
    /// List commits with change counts
    Commits {
        /// Branch or revision to walk
        #[arg(short, long, default_value = DEFAULT_REFERENCE)]
        branch: String,
    },
    /// List merge commits on HEAD with inferred direction
    Merges,
    /// Per-author totals
    Authors,
    /// Per-file change totals
    Files,
    /// Local branches
    Branches,
    /// Commit totals bucketed by day, week or month
    Timeline {
        #[arg(short, long, default_value = "day")]
        period: Period,
    },
    /// Commit graph across all local branches
    Graph,
    /// Merges reachable from any local branch, newest first
    MergeHistory,
    /// Source to target branch merge counts
    Flows,
    /// Repository-wide totals
    Summary,
    /// Commits per weekday and hour
    Heatmap,
    /// Commits per author per ISO week
    Activity,
    /// Merges per day
    MergeFrequency,
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AnalyzerConfig::load(path)?,
        None => AnalyzerConfig::default(),
    };

    // Day bounds are inclusive of the whole day
    let since: Option<NaiveDateTime> = cli.since.and_then(|d| d.and_hms_opt(0, 0, 0));
    let until: Option<NaiveDateTime> = cli.until.and_then(|d| d.and_hms_opt(23, 59, 59));

    let analyzer = GitAnalyzer::open_with_config(&cli.repo, config)
        .with_context(|| format!("cannot open repository '{}'", cli.repo))?;

    match cli.command {
        Commands::Info => print_json(&analyzer.repo_info()?)?,
        Commands::Commits { branch } => print_json(&analyzer.commit_stats(since, until, &branch))?,
        Commands::Merges => print_json(&analyzer.merge_stats(since, until))?,
        Commands::Authors => print_json(&analyzer.author_stats(since, until))?,
        Commands::Files => print_json(&analyzer.file_stats(since, until))?,
        Commands::Branches => print_json(&analyzer.branch_stats())?,
        Commands::Timeline { period } => {
            print_json(&analyzer.time_series_stats(period, since, until))?
        }
        Commands::Graph => print_json(&analyzer.branch_graph_data())?,
        Commands::MergeHistory => print_json(&analyzer.merge_direction_history())?,
        Commands::Flows => print_json(&analyzer.merge_flows())?,
        Commands::Summary => print_json(&analyzer.summary(since, until))?,
        Commands::Heatmap => print_json(&analyzer.commit_heatmap(since, until))?,
        Commands::Activity => print_json(&analyzer.author_activity(since, until))?,
        Commands::MergeFrequency => print_json(&analyzer.merge_frequency(since, until))?,
    }

    analyzer.close()?;
    Ok(())
}
