use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use importer::{
    IngestionPipeline, ParkrunFetcher, PipelineConfig,
    config::{
        DEFAULT_ATHLETES_PATH, DEFAULT_BASE_URL, DEFAULT_CONCURRENCY, DEFAULT_RESULTS_PATH,
        DEFAULT_TIMEOUT_SECS,
    },
};
use storage::codec::{format_date, format_time};
use storage::services::analytics;
use storage::{AthleteRepository, ResultRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "import")]
#[command(about = "parkrun results importer and analytics", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Result history CSV
    #[arg(
        long,
        global = true,
        env = "PARKRUN_RESULTS_PATH",
        default_value = DEFAULT_RESULTS_PATH
    )]
    results: PathBuf,

    /// Athlete configuration CSV (Name, ParkrunID)
    #[arg(
        long,
        global = true,
        env = "PARKRUN_ATHLETES_PATH",
        default_value = DEFAULT_ATHLETES_PATH
    )]
    athletes: PathBuf,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every configured athlete and merge into the history
    Fetch {
        #[arg(long, env = "PARKRUN_BASE_URL", default_value = DEFAULT_BASE_URL)]
        base_url: String,

        #[arg(long, env = "PARKRUN_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,

        #[arg(long, env = "PARKRUN_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print per-event series for one athlete, or for everyone in the history
    Series {
        #[command(flatten)]
        target: SeriesTarget,
    },
    /// Check the athlete configuration without fetching anything
    Validate,
}

#[derive(clap::Args)]
#[group(required = true, multiple = false)]
struct SeriesTarget {
    #[arg(short, long)]
    athlete_id: Option<String>,

    #[arg(long)]
    all: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "import={},importer={},storage={}",
                    log_level, log_level, log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Fetch {
            base_url,
            timeout_secs,
            concurrency,
            json,
        } => {
            let config = PipelineConfig {
                results_path: cli.results,
                athletes_path: cli.athletes,
                base_url,
                fetch_timeout: Duration::from_secs(timeout_secs),
                max_concurrent_fetches: concurrency,
            };
            handle_fetch(config, json).await?;
        }
        Commands::Series { target } => {
            handle_series(&cli.results, target)?;
        }
        Commands::Validate => {
            handle_validate(&cli.athletes)?;
        }
    }

    Ok(())
}

async fn handle_fetch(config: PipelineConfig, json: bool) -> anyhow::Result<()> {
    config.validate()?;

    let athletes = AthleteRepository::new(&config.athletes_path)
        .load()
        .with_context(|| format!("reading {}", config.athletes_path.display()))?;
    if athletes.is_empty() {
        tracing::warn!(
            "No athletes configured in {}",
            config.athletes_path.display()
        );
    }

    let fetcher = ParkrunFetcher::new(&config)?;
    let store = ResultRepository::new(&config.results_path);
    let pipeline = IngestionPipeline::new(Arc::new(fetcher), store.clone(), &config);

    let report = pipeline.run(&athletes).await?;
    report.log_summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if !report.success {
        bail!(
            "ingestion did not update {} ({} of {} athlete(s) failed)",
            config.results_path.display(),
            report.failed(),
            report.outcomes.len()
        );
    }

    let history = store.load()?;
    let mut bests: Vec<_> = analytics::current_personal_bests(&history)
        .into_iter()
        .collect();
    bests.sort();
    for (athlete_id, (seconds, date)) in bests {
        let name = history.athlete_name(&athlete_id).unwrap_or("unknown");
        tracing::info!(
            "PB {} ({}): {} on {}",
            name,
            athlete_id,
            format_time(seconds),
            format_date(date)
        );
    }

    Ok(())
}

fn handle_series(results: &Path, target: SeriesTarget) -> anyhow::Result<()> {
    let history = ResultRepository::new(results)
        .load()
        .with_context(|| format!("reading {}", results.display()))?;

    let output = match target.athlete_id {
        Some(id) if !target.all => {
            let athlete_id = storage::ParkrunId::new(id);
            let response = analytics::athlete_series(&history, athlete_id.as_str());
            if response.is_empty() {
                tracing::warn!("No results stored for athlete {}", response.athlete_id);
            }
            serde_json::to_string_pretty(&response)?
        }
        _ => {
            let responses: Vec<_> = history
                .athlete_ids()
                .into_iter()
                .map(|id| analytics::athlete_series(&history, id))
                .collect();
            serde_json::to_string_pretty(&responses)?
        }
    };
    println!("{}", output);

    Ok(())
}

fn handle_validate(athletes_path: &Path) -> anyhow::Result<()> {
    let athletes = AthleteRepository::new(athletes_path)
        .load()
        .with_context(|| format!("reading {}", athletes_path.display()))?;

    tracing::info!(
        "{} valid athlete(s) in {}",
        athletes.len(),
        athletes_path.display()
    );
    for athlete in &athletes {
        tracing::info!("  - {} ({})", athlete.name, athlete.athlete_id());
    }

    Ok(())
}
