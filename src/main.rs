// * backlink-intel CLI
// * JSON in, JSON out; all scoring and discovery lives in the library

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use backlink_intel::config::EngineConfig;
use backlink_intel::discovery::{live_search_slots, search, StaticBacklinkSource};
use backlink_intel::model::BacklinkRecord;
use backlink_intel::ops::telemetry;
use backlink_intel::BacklinkEngine;

const DEFAULT_REQUESTS_PER_MINUTE: u32 = 20;

#[derive(Debug, Parser)]
#[command(name = "backlink-intel", version, about = "Backlink toxicity, health and opportunity analysis")]
struct Cli {
    /// JSON config file (heuristic tables and discovery limits)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Human-readable logs instead of JSON
    #[arg(long, global = true)]
    pretty_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score a link set exported from a backlink index
    Analyze(AnalyzeArgs),
    /// Search for unlinked mentions of a brand
    Opportunities(OpportunitiesArgs),
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    #[arg(long)]
    domain: String,

    /// JSON array of backlink records
    #[arg(long)]
    links: PathBuf,

    #[arg(long)]
    region: Option<String>,

    /// Print the disavow file instead of the analysis
    #[arg(long)]
    disavow: bool,
}

#[derive(Debug, Args)]
struct OpportunitiesArgs {
    #[arg(long)]
    domain: String,

    /// Brand name to search for; defaults to the first domain label
    #[arg(long)]
    brand: Option<String>,

    #[arg(long = "competitor")]
    competitors: Vec<String>,

    #[arg(long)]
    region: Option<String>,

    /// Per-source search quota
    #[arg(long, default_value_t = DEFAULT_REQUESTS_PER_MINUTE)]
    requests_per_minute: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.pretty_logs {
        telemetry::init_tracing_pretty();
    } else {
        telemetry::init_tracing();
    }

    let config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    }
    .apply_env_overrides()
    .context("Invalid BACKLINK_* environment override")?;

    match cli.command {
        Command::Analyze(args) => run_analyze(config, args).await,
        Command::Opportunities(args) => run_opportunities(config, args).await,
    }
}

async fn run_analyze(config: EngineConfig, args: AnalyzeArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.links)
        .with_context(|| format!("Failed to read {}", args.links.display()))?;
    let records: Vec<BacklinkRecord> =
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", args.links.display()))?;
    tracing::info!(records = records.len(), path = %args.links.display(), "Loaded link set");

    let engine = BacklinkEngine::builder()
        .config(config)
        .backlink_source(Arc::new(StaticBacklinkSource::new(records)))
        .build();

    let result = engine
        .analyze_backlinks(&args.domain, args.region.as_deref())
        .await
        .context("Backlink analysis failed")?;

    if args.disavow {
        print!("{}", engine.generate_disavow_file(&result.toxic_links));
    } else {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    Ok(())
}

async fn run_opportunities(config: EngineConfig, args: OpportunitiesArgs) -> Result<()> {
    let client = search::default_client().context("Failed to build HTTP client")?;
    let slots = live_search_slots(client, args.requests_per_minute).context("Failed to build search sources")?;

    let engine = BacklinkEngine::builder().config(config).mention_slots(slots).build();

    // * Ctrl-C aborts every in-flight search
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling discovery");
            signal_token.cancel();
        }
    });

    let result = engine
        .generate_opportunities_with_cancel(
            &args.domain,
            args.brand.as_deref(),
            &args.competitors,
            args.region.as_deref(),
            cancel,
        )
        .await
        .context("Opportunity discovery failed")?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
