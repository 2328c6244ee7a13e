use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use rentstab_to_csv::{
    ExtractionReport, FlattenReport, PageSelection, ScanOptions, extract_pdf_to_csv, flatten_csv,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "rentstab",
    version,
    about = "Convert rent-stabilized building registry PDFs into CSV"
)]
struct Cli {
    /// Log progress and per-page details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rebuild the registry table from a PDF.
    Scan(ScanArgs),
    /// Split both address slots of a scanned CSV into one row per building.
    Flatten(FlattenArgs),
}

#[derive(Debug, Args)]
struct ScanArgs {
    /// Input PDF path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV path. Defaults to the input path with a .csv extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page selection like 1-3,5.
    #[arg(long)]
    pages: Option<String>,

    /// Page whose header row defines the column boundaries.
    #[arg(long, default_value_t = 1)]
    header_page: u32,

    /// Header positions closer than this many points are one column.
    #[arg(long, default_value_t = 2.0)]
    header_tolerance: f64,

    /// Vertical distance folded into one line.
    #[arg(long, default_value_t = 1.0)]
    row_granularity: f64,

    /// Output delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Also write the extraction report as JSON.
    #[arg(long)]
    report_json: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct FlattenArgs {
    /// Scanned CSV path.
    #[arg(short, long)]
    input: PathBuf,

    /// Flattened CSV path.
    #[arg(short, long)]
    output: PathBuf,

    /// Borough written on every row, overriding any BOROUGH column.
    #[arg(long)]
    borough: Option<String>,

    /// Delimiter of both CSV files.
    #[arg(long, default_value = ",")]
    delimiter: char,
}

fn ascii_delimiter(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }
    Ok(delimiter as u8)
}

fn parse_options(args: &ScanArgs) -> Result<ScanOptions> {
    let pages = args
        .pages
        .as_deref()
        .map(PageSelection::from_str)
        .transpose()
        .map_err(|error| anyhow!("invalid page selection: {error}"))
        .context("failed to parse --pages")?;

    Ok(ScanOptions {
        header_page: args.header_page,
        header_tolerance: args.header_tolerance,
        row_granularity: args.row_granularity,
        pages,
        delimiter: ascii_delimiter(args.delimiter)?,
        ..ScanOptions::default()
    })
}

fn log_report(report: &ExtractionReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} page={:?} detected={:?} expected={:?}: {}",
                warning.code, warning.page, warning.detected, warning.expected, warning.message
            );
        }
    }
}

fn run_scan(args: &ScanArgs) -> Result<ExtractionReport> {
    let options = parse_options(args)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("csv"));

    let report = extract_pdf_to_csv(&args.input, &output, &options)
        .with_context(|| format!("failed to scan '{}'", args.input.display()))?;

    if let Some(path) = &args.report_json {
        let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write report '{}'", path.display()))?;
    }
    Ok(report)
}

fn run_flatten(args: &FlattenArgs) -> Result<FlattenReport> {
    let delimiter = ascii_delimiter(args.delimiter)?;
    flatten_csv(
        &args.input,
        &args.output,
        args.borough.as_deref(),
        delimiter,
    )
    .with_context(|| format!("failed to flatten '{}'", args.input.display()))
}

fn exit_for_rows(rows: usize) -> ExitCode {
    if rows > 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "rentstab_to_csv=info"
    } else {
        "rentstab_to_csv=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let outcome = match &cli.command {
        Commands::Scan(args) => run_scan(args).map(|report| {
            log_report(&report, cli.verbose);
            report.row_count
        }),
        Commands::Flatten(args) => run_flatten(args).map(|report| report.output_rows),
    };

    match outcome {
        Ok(rows) => exit_for_rows(rows),
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
