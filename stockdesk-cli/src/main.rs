//! stockdesk CLI: query, chart and export stock price CSV files.
//!
//! Commands:
//! - `list`: filtered, sorted rows as a table or JSON
//! - `chart`: per-ticker close series on a shared date axis, as JSON
//! - `export`: write rows, series and a manifest into a run directory
//! - `sources`: per-file row counts of the source directory

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use stockdesk_core::export::{export_run, ExportRequest};
use stockdesk_core::{
    pivot, query, AppConfig, PriceRecord, QueryFilter, SortDir, SortKey, StockService, TickerSet,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_DIRECTIVE: &str = "stockdesk=info";
const NO_ROWS_MESSAGE: &str = "No data for the selected filter";

#[derive(Parser)]
#[command(
    name = "stockdesk",
    about = "stockdesk: query and chart daily stock prices from CSV files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where to read from; overrides config file and environment.
#[derive(Args)]
struct SourceArgs {
    /// Directory containing the *.csv source files.
    #[arg(long)]
    csv_root: Option<PathBuf>,

    /// Path to a TOML config file. Defaults to ./stockdesk.toml if present.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct FilterArgs {
    /// Comma-separated tickers (e.g., ABC,XYZ). Empty means all.
    #[arg(long, default_value = "")]
    tickers: String,

    /// Inclusive start date (YYYY-MM-DD).
    #[arg(long)]
    start: Option<String>,

    /// Inclusive end date (YYYY-MM-DD).
    #[arg(long)]
    end: Option<String>,
}

#[derive(Args)]
struct SortArgs {
    /// Sort key: date, ticker, open, high, low, close, volume.
    #[arg(long, default_value = "date")]
    sort_by: String,

    /// Sort direction: asc or desc.
    #[arg(long, default_value = "asc")]
    sort_dir: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print filtered rows.
    List {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        sort: SortArgs,

        /// Print JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the close-price series matrix as JSON.
    Chart {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Write rows.csv, series.json and manifest.json into a new run directory.
    Export {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        sort: SortArgs,

        /// Parent directory for export runs.
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
    /// List source files with their parsed row counts.
    Sources {
        #[command(flatten)]
        source: SourceArgs,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::List {
            source,
            filter,
            sort,
            json,
        } => run_list(&source, &filter, &sort, json),
        Commands::Chart { source, filter } => run_chart(&source, &filter),
        Commands::Export {
            source,
            filter,
            sort,
            export_dir,
        } => run_export(&source, &filter, &sort, export_dir),
        Commands::Sources { source } => run_sources(&source),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file and environment first, then CLI flags on top.
fn resolve_config(source: &SourceArgs) -> Result<AppConfig> {
    let mut config = AppConfig::load(source.config.as_deref()).context("loading configuration")?;
    if let Some(root) = &source.csv_root {
        config.csv_root = root.clone();
    }
    debug!(csv_root = %config.csv_root.display(), "using source directory");
    Ok(config)
}

fn parse_date_arg(flag: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .with_context(|| format!("--{flag} must be YYYY-MM-DD, got '{s}'"))
        })
        .transpose()
}

fn build_filter(args: &FilterArgs) -> Result<QueryFilter> {
    Ok(QueryFilter::new(
        TickerSet::parse(&args.tickers),
        parse_date_arg("start", args.start.as_deref())?,
        parse_date_arg("end", args.end.as_deref())?,
    ))
}

fn sort_of(args: &SortArgs) -> (SortKey, SortDir) {
    (SortKey::parse(&args.sort_by), SortDir::parse(&args.sort_dir))
}

fn run_list(source: &SourceArgs, filter: &FilterArgs, sort: &SortArgs, json: bool) -> Result<()> {
    let service = StockService::from_config(&resolve_config(source)?);
    let filter = build_filter(filter)?;
    let (key, dir) = sort_of(sort);

    let rows = service.query(&filter, key, dir);

    if json {
        println!("{}", serde_json::to_string_pretty(&list_json(&rows)?)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("{NO_ROWS_MESSAGE}");
        println!("Rows: 0");
        return Ok(());
    }

    print_rows(&rows);
    println!();
    println!("Rows: {}", rows.len());
    Ok(())
}

/// Rows as a JSON array, or a message object with a zero row count.
fn list_json(rows: &[PriceRecord]) -> Result<serde_json::Value> {
    if rows.is_empty() {
        return Ok(serde_json::json!({ "message": NO_ROWS_MESSAGE, "rows": 0 }));
    }
    Ok(serde_json::to_value(rows)?)
}

fn run_chart(source: &SourceArgs, filter: &FilterArgs) -> Result<()> {
    let service = StockService::from_config(&resolve_config(source)?);
    let matrix = service.chart(&build_filter(filter)?);

    if matrix.is_empty() {
        println!("No data to display in the chart");
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&matrix)?);
    Ok(())
}

fn run_export(
    source: &SourceArgs,
    filter: &FilterArgs,
    sort: &SortArgs,
    export_dir: Option<PathBuf>,
) -> Result<()> {
    let config = resolve_config(source)?;
    let export_dir = export_dir.unwrap_or_else(|| config.export_dir.clone());
    let filter = build_filter(filter)?;
    let (key, dir) = sort_of(sort);

    // Rows and series come from one snapshot of the source directory
    let dataset = StockService::from_config(&config).load_all();
    let rows = query(&dataset, &filter, key, dir);
    let matrix = pivot(&dataset, &filter);
    let fingerprint = dataset.fingerprint();

    let paths = export_run(
        &export_dir,
        &ExportRequest {
            title: &config.report_title,
            filter: &filter,
            sort_key: key,
            sort_dir: dir,
            rows: &rows,
            matrix: &matrix,
            dataset_fingerprint: &fingerprint,
        },
    )
    .with_context(|| format!("exporting to {}", export_dir.display()))?;

    println!("Rows: {}", rows.len());
    println!("Tickers: {}", matrix.series().len());
    println!("Export saved to: {}", paths.dir.display());
    Ok(())
}

fn run_sources(source: &SourceArgs) -> Result<()> {
    let config = resolve_config(source)?;
    let summaries = StockService::from_config(&config).sources();

    if summaries.is_empty() {
        println!("No CSV files found in: {}", config.csv_root.display());
        return Ok(());
    }

    println!("Source: {}", config.csv_root.display());
    println!();
    println!("{:<40} {:>8} {:>8}", "File", "Rows", "Skipped");
    println!("{}", "-".repeat(58));
    for s in &summaries {
        let name = s
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if s.readable {
            println!("{:<40} {:>8} {:>8}", name, s.rows, s.skipped_rows);
        } else {
            println!("{:<40} {:>8} {:>8}", name, "(unreadable)", "");
        }
    }
    let total: usize = summaries.iter().map(|s| s.rows).sum();
    println!();
    println!("Total rows: {total}");
    Ok(())
}

fn print_rows(rows: &[PriceRecord]) {
    let price = |v: Option<Decimal>| v.map(|d| d.to_string()).unwrap_or_else(|| "-".into());

    println!(
        "{:<12} {:<8} {:>12} {:>12} {:>12} {:>12} {:>14}",
        "Date", "Ticker", "Open", "High", "Low", "Close", "Volume"
    );
    println!("{}", "-".repeat(88));
    for row in rows {
        println!(
            "{:<12} {:<8} {:>12} {:>12} {:>12} {:>12} {:>14}",
            row.date().map(|d| d.to_string()).unwrap_or_default(),
            row.ticker().unwrap_or_default(),
            price(row.open()),
            price(row.high()),
            price(row.low()),
            price(row.close()),
            row.volume(),
        );
    }
}
