use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use memory_scan::config::{load_config, validate_config, Config, ConfigLoader};
use memory_scan::{
    Address, ManualScanner, MemoryAlignment, MemoryError, MemoryValue, ScanCompareType, ScanConstraints,
    ScanOptions, Snapshot, SnapshotRegion, SnapshotScanner, TaskOutcome, TaskScheduler, ValueType,
};

/// Scan a raw memory dump for values matching a constraint
#[derive(Debug, Parser)]
#[command(name = "memory-scan", version)]
struct Cli {
    /// Raw memory dump to scan
    dump: PathBuf,

    /// Value type: i8, i16, i32, i64, u8, u16, u32, u64, f32 or f64
    value_type: ValueType,

    /// Comparison, e.g. equal, greater_than, changed, increased_by
    compare: ScanCompareType,

    /// Literal to compare against, decimal or 0x-prefixed hex
    value: Option<String>,

    /// Earlier dump of the same memory, for delta comparisons
    #[arg(long)]
    previous: Option<PathBuf>,

    /// Alignment of candidate addresses in bytes (1, 2, 4 or 8)
    #[arg(long)]
    alignment: Option<usize>,

    /// Address the first byte of the dump was captured from
    #[arg(long, default_value = "0")]
    base: Address,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct MatchOutput {
    address: String,
    length: usize,
    value: Option<String>,
    bytes: String,
}

#[derive(Debug, Serialize)]
struct ScanOutput {
    value_type: ValueType,
    compare: ScanCompareType,
    alignment: usize,
    result_count: usize,
    matches: Vec<MatchOutput>,
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.logging.with_target)
        .with_writer(std::io::stderr)
        .init();
}

async fn load_snapshot(cli: &Cli) -> Result<Snapshot> {
    let current = tokio::fs::read(&cli.dump)
        .await
        .with_context(|| format!("reading dump {}", cli.dump.display()))?;
    let mut region = SnapshotRegion::new(cli.base, current)?;

    if let Some(path) = &cli.previous {
        let previous = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading previous dump {}", path.display()))?;
        region = region.with_previous(previous)?;
    }

    Ok(Snapshot::new(vec![region])?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::new(path).load()?,
        None => load_config()?,
    };
    validate_config(&config)?;
    init_logging(&config);

    info!("Starting memory-scan v{}", env!("CARGO_PKG_VERSION"));

    let alignment =
        MemoryAlignment::try_from(cli.alignment.unwrap_or(config.scanner.default_alignment))?;
    let value = cli
        .value
        .as_deref()
        .map(|text| MemoryValue::parse(text, cli.value_type))
        .transpose()?;
    let constraints = ScanConstraints::new(cli.value_type, alignment, cli.compare, value);

    let snapshot = Arc::new(load_snapshot(&cli).await?);
    let scanner = SnapshotScanner::new(ScanOptions::from(&config))?;
    let manual = ManualScanner::new(TaskScheduler::current()?, scanner);

    let task = manual.scan(Arc::clone(&snapshot), constraints.clone(), "memory-scan-cli")?;
    let cancellation = task.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, canceling scan");
            cancellation.cancel();
        }
    });

    let results = match task.result().await {
        TaskOutcome::Completed(results) => results,
        TaskOutcome::Canceled => bail!("scan canceled"),
        TaskOutcome::Failed(reason) => {
            return Err(MemoryError::task_failed(ManualScanner::NAME, reason).into())
        }
    };

    let alignment_bytes = constraints.alignment_bytes();
    let matches = results
        .matches
        .iter()
        .map(|matched| {
            let bytes = snapshot
                .find_region(matched.address)
                .map(|region| {
                    let start = matched.address.as_usize() - region.base_address().as_usize();
                    hex::encode(&region.current_bytes()[start..start + matched.length])
                })
                .unwrap_or_default();
            MatchOutput {
                address: matched.address.to_string(),
                length: matched.length,
                value: snapshot
                    .read_value(matched.address, constraints.value_type)
                    .map(|value| value.to_string()),
                bytes,
            }
        })
        .collect();

    let output = ScanOutput {
        value_type: constraints.value_type,
        compare: cli.compare,
        alignment: alignment_bytes,
        result_count: results.result_count(alignment_bytes),
        matches,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
