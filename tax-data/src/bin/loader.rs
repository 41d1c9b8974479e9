use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tax_core::{TaxYearConfig, TaxYearConfigStore};
use tax_data::{SnapshotLoader, TaxBracketLoader, logging};
use tracing::info;

/// Build a validated federal tax-year snapshot and write it as JSON.
///
/// The starting point is either a JSON snapshot (`--snapshot`) or the
/// compiled-in snapshot for `--year`. Bracket schedules from a CSV file
/// (`--brackets`) replace the ordinary-income brackets. The CSV file should
/// have the following columns:
/// - tax_year: The tax year (e.g., 2025)
/// - schedule: The IRS schedule code (X, Y-1, Y-2, Z)
/// - min_income: The minimum income for this bracket
/// - max_income: The maximum income (empty for unlimited)
/// - base_tax: The base tax amount for this bracket
/// - rate: The marginal tax rate as a decimal (e.g., 0.10)
#[derive(Parser, Debug)]
#[command(name = "tax-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a JSON tax-year snapshot to start from
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Path to a CSV file of IRS rate schedules
    #[arg(short, long)]
    brackets: Option<PathBuf>,

    /// Tax year to use when no snapshot is given
    #[arg(short, long, default_value_t = 2025)]
    year: i32,

    /// Where to write the resulting snapshot (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "tax_data=trace" (defaults to RUST_LOG, then info)
    #[arg(long)]
    log_level: Option<String>,
}

fn base_snapshot(args: &Args) -> Result<TaxYearConfig> {
    match &args.snapshot {
        Some(path) => {
            info!(path = %path.display(), "loading snapshot");
            let file = File::open(path)
                .with_context(|| format!("Failed to open: {}", path.display()))?;
            SnapshotLoader::from_json(file)
                .with_context(|| format!("Failed to load snapshot: {}", path.display()))
        }
        None => {
            info!(tax_year = args.year, "starting from builtin snapshot");
            let store = TaxYearConfigStore::builtin().context("Builtin snapshots are invalid")?;
            let config = store
                .load(args.year)
                .with_context(|| format!("No builtin snapshot for {}", args.year))?;
            Ok(config.as_ref().clone())
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.log_level.as_deref())?;

    let mut config = base_snapshot(&args)?;

    if let Some(path) = &args.brackets {
        info!(path = %path.display(), "loading tax brackets");
        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let records = TaxBracketLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        info!(records = records.len(), "parsed bracket records");

        let schedules = TaxBracketLoader::build_schedules(&records, config.tax_year)
            .with_context(|| format!("Invalid {} brackets in {}", config.tax_year, path.display()))?;
        config = SnapshotLoader::with_brackets(config, schedules)?;
    }

    // Registering proves the snapshot is acceptable to the engine.
    let mut store = TaxYearConfigStore::new();
    store
        .register(config.clone())
        .context("Snapshot failed validation")?;
    for (status, schedule) in config.brackets.iter() {
        info!(
            tax_year = config.tax_year,
            filing_status = status.as_str(),
            brackets = schedule.brackets().len(),
            top_rate = %schedule.top_rate(),
            "bracket schedule"
        );
    }

    let json = SnapshotLoader::to_json(&config)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json.as_bytes())
                .with_context(|| format!("Failed to write: {}", path.display()))?;
            info!(tax_year = config.tax_year, path = %path.display(), "wrote snapshot");
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").context("Failed to write snapshot to stdout")?;
        }
    }

    Ok(())
}
