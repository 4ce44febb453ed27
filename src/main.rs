//! Mood Ranker - Entry Point

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mood_ranker::config::AppConfig;
use mood_ranker::mood::{parse_predictions, ReferenceSetBuilder};
use mood_ranker::pipeline::{FailurePolicy, RankingRun};
use mood_ranker::report;
use mood_ranker::storage::{CatalogSource, JsonFileCatalog};

#[derive(Debug, Parser)]
#[command(name = "mood-ranker", version, about = "Rank a song catalog by mood similarity")]
struct Cli {
    /// Config file (defaults to ./mood-ranker.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank the catalog and print the leaderboard
    Rank(RankArgs),
    /// Show how many reference tracks each configured category has
    References(ReferencesArgs),
}

#[derive(Debug, Args)]
struct RankArgs {
    /// JSON catalog file
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Target category, highest priority first (repeatable)
    #[arg(long = "category", short = 'c')]
    categories: Vec<String>,

    /// Emotion prediction file (`{"label": score, ...}`) used when no
    /// --category is given
    #[arg(long, conflicts_with = "categories")]
    emotions: Option<PathBuf>,

    /// Leaderboard size
    #[arg(long, short = 'k')]
    top_k: Option<usize>,

    /// Skip tracks that fail to score instead of aborting
    #[arg(long)]
    skip_failures: bool,

    /// Score partitions of the catalog on multiple threads
    #[cfg(feature = "parallel")]
    #[arg(long)]
    parallel: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct ReferencesArgs {
    /// JSON catalog file
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Rank(args) => rank(&config, args),
        Command::References(args) => references(&config, args),
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mood_ranker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(AppConfig::load().unwrap_or_else(|e| {
            warn!("Failed to load config: {e}, using defaults");
            AppConfig::default()
        })),
    }
}

fn open_catalog(config: &AppConfig, path: Option<PathBuf>) -> anyhow::Result<JsonFileCatalog> {
    let path = path
        .or_else(|| config.catalog.path.clone())
        .context("No catalog given: pass --catalog or set MOOD_RANKER_CATALOG__PATH")?;

    JsonFileCatalog::open(&path, &config.catalog.schema())
        .with_context(|| format!("Failed to open catalog {}", path.display()))
}

fn rank(config: &AppConfig, args: RankArgs) -> anyhow::Result<()> {
    let targets = if !args.categories.is_empty() {
        args.categories
    } else if let Some(path) = &args.emotions {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let predictions = parse_predictions(&text).context("Malformed emotion predictions")?;
        config
            .labels
            .table()
            .categories_for(&predictions, config.labels.limit)
    } else {
        bail!("No target categories: pass --category or --emotions");
    };

    if targets.is_empty() {
        bail!("None of the predicted emotion labels map to a mood category");
    }
    info!(targets = ?targets, "Target categories resolved");

    let catalog = open_catalog(config, args.catalog)?;

    let reference_items = catalog.fetch_references(&config.ranking.categories)?;
    let references =
        ReferenceSetBuilder::new(config.ranking.categories.iter().cloned()).build(&reference_items)?;

    let policy = if args.skip_failures {
        FailurePolicy::Skip
    } else {
        config.ranking.failure_policy
    };
    let top_k = args.top_k.unwrap_or(config.ranking.top_k);
    let run = RankingRun::new(&references, &targets, top_k)?.with_policy(policy);

    let candidates = catalog.fetch_all()?;

    #[cfg(feature = "parallel")]
    let report = if args.parallel {
        run.run_parallel(&candidates)?
    } else {
        run.run(&candidates)?
    };
    #[cfg(not(feature = "parallel"))]
    let report = run.run(&candidates)?;

    match args.format {
        OutputFormat::Text => print!("{}", report::render_text(&report)),
        OutputFormat::Json => println!("{}", report::render_json(&report)?),
    }

    Ok(())
}

fn references(config: &AppConfig, args: ReferencesArgs) -> anyhow::Result<()> {
    let catalog = open_catalog(config, args.catalog)?;

    println!("{} tracks in catalog", catalog.count()?);
    for category in &config.ranking.categories {
        let count = catalog.fetch_tagged(category)?.len();
        let marker = if count == 0 { "  (missing)" } else { "" };
        println!("{category}: {count}{marker}");
    }

    Ok(())
}
