// ABOUTME: CLI for running configured site harvests and persisting new records.
// ABOUTME: Loads the site configuration, runs the selected sites and prints a summary or JSON reports.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use sitetrawl_harvest::{Harvester, RunReport, SiteRegistry};
use sitetrawl_ledger::{CsvLedger, DataLayout, MediaVault};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sitetrawl")]
#[command(about = "Harvest new entries from configured media listing sites")]
struct Args {
    /// Site configuration document (JSON)
    #[arg(short = 'c', long = "config")]
    config: PathBuf,

    /// Data directory holding tables and downloaded media
    #[arg(short = 'd', long = "data-dir", default_value = "data")]
    data_dir: PathBuf,

    /// Site key to run; repeat for several (default: every configured site)
    #[arg(short = 's', long = "site")]
    sites: Vec<String>,

    /// Number of sites harvested at the same time
    #[arg(long = "concurrency", default_value_t = 1)]
    concurrency: usize,

    /// Print run reports as JSON
    #[arg(long = "json")]
    json: bool,

    /// Extract and classify only: no downloads, no table writes
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// List configured site keys and exit
    #[arg(long = "list")]
    list: bool,
}

#[derive(Serialize)]
struct SiteOutcome {
    key: String,
    ok: bool,
    report: Option<RunReport>,
    error: Option<String>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn select_keys(registry: &SiteRegistry, requested: &[String]) -> Result<Vec<String>> {
    if requested.is_empty() {
        if registry.is_empty() {
            bail!("configuration defines no sites");
        }
        return Ok(registry.keys().into_iter().map(str::to_string).collect());
    }
    Ok(requested.iter().map(|k| k.to_lowercase()).collect())
}

fn print_summary(outcomes: &[SiteOutcome]) {
    for outcome in outcomes {
        match (&outcome.report, &outcome.error) {
            (Some(r), _) => println!(
                "{} ({}): {} new, {} skipped, {} discarded, {} degraded{}",
                r.site,
                outcome.key,
                r.records.len(),
                r.skipped,
                r.discarded,
                r.degraded,
                if r.persisted { "" } else { " (not persisted)" }
            ),
            (None, Some(e)) => println!("{}: failed: {}", outcome.key, e),
            (None, None) => println!("{}: no result", outcome.key),
        }
    }
}

async fn run(args: Args) -> Result<bool> {
    let registry = SiteRegistry::from_path(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    if args.list {
        for key in registry.keys() {
            println!("{}", key);
        }
        return Ok(true);
    }

    let keys = select_keys(&registry, &args.sites)?;
    let harvester = Harvester::builder()
        .dry_run(args.dry_run)
        .build()
        .context("building harvester")?;

    let layout = DataLayout::new(&args.data_dir);
    let ledger = CsvLedger::new(layout.clone());
    let vault = MediaVault::new(layout);

    info!(sites = keys.len(), data_dir = %args.data_dir.display(), dry_run = args.dry_run, "starting harvest");
    let mut results = harvester
        .run_sites(&registry, &keys, &ledger, Some(&vault), args.concurrency)
        .await;
    results.sort_by(|a, b| a.0.cmp(&b.0));

    let outcomes: Vec<SiteOutcome> = results
        .into_iter()
        .map(|(key, result)| match result {
            Ok(report) => SiteOutcome {
                key,
                ok: true,
                report: Some(report),
                error: None,
            },
            Err(e) => SiteOutcome {
                key,
                ok: false,
                report: None,
                error: Some(e.to_string()),
            },
        })
        .collect();
    let all_ok = outcomes.iter().all(|o| o.ok);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        print_summary(&outcomes);
    }
    Ok(all_ok)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
