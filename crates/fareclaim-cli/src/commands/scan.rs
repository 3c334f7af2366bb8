//! Scan command - extract receipt data from a directory.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Args, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

use fareclaim_core::models::receipt::ReceiptRecord;
use fareclaim_core::pdf::PdfTextExtractor;
use fareclaim_core::receipt::{ReceiptParser, ReceiptStore, ScanStatus, ScanSummary};

use super::load_config;

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Directory containing receipt files
    #[arg(required = true)]
    directory: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Receipt file extension (overrides config)
    #[arg(short, long)]
    extension: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text table
    Text,
}

#[derive(Serialize)]
struct ScanOutput<'a> {
    receipts: &'a [ReceiptRecord],
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let extension = args.extension.unwrap_or(config.scan.extension);

    info!("Scanning {} for .{} receipts", args.directory.display(), extension);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Reading receipts in {}", args.directory.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let store = ReceiptStore::new(ReceiptParser::new(PdfTextExtractor::new()), extension);
    let scan = store.scan(&args.directory);
    spinner.finish_and_clear();
    let scan = scan?;

    if scan.status == ScanStatus::DirectoryNotFound {
        anyhow::bail!("Receipts directory not found: {}", scan.directory.display());
    }

    let records = scan.receipts.records();
    let output = format_records(&records, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    print_summary(&scan.receipts.summary(), start.elapsed());

    Ok(())
}

fn format_records(records: &[ReceiptRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&ScanOutput { receipts: records })?),
        OutputFormat::Csv => format_csv(records),
        OutputFormat::Text => Ok(format_text(records)),
    }
}

fn format_csv(records: &[ReceiptRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["path", "amount", "date", "source", "destination"])?;
    for record in records {
        wtr.write_record([
            &record.path,
            &record.amount,
            &record.date,
            &record.source,
            &record.destination,
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(records: &[ReceiptRecord]) -> String {
    let mut output = String::new();

    for (index, record) in records.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }
        output.push_str(&format!("{}\n", record.path));
        output.push_str(&format!("  Amount:      {}\n", record.amount));
        output.push_str(&format!("  Date:        {}\n", record.date));
        output.push_str(&format!("  Source:      {}\n", record.source));
        output.push_str(&format!("  Destination: {}\n", record.destination));
    }

    if records.is_empty() {
        output.push_str("No receipts found.\n");
    }

    output
}

fn print_summary(summary: &ScanSummary, elapsed: Duration) {
    eprintln!();
    eprintln!(
        "{} Scanned {} receipts in {:?}",
        style("✓").green(),
        summary.total,
        elapsed
    );
    eprintln!(
        "   {} resolved, {} without amount, {} unreadable",
        style(summary.resolved).green(),
        style(summary.unresolved).yellow(),
        style(summary.errored).red()
    );
}
