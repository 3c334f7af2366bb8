//! Submit command - claim every receipt in a directory on the portal.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, ValueEnum};
use console::{style, StyledObject, Term};
use tracing::{debug, info};

use fareclaim_core::agent::WebDriverAgent;
use fareclaim_core::claim::{
    run_claims, BatchSummary, ClaimKind, ClaimPhase, ClaimSubmitter, Confirmation,
    ConfirmationSource, Decline, PortalKeywordVerifier, SubmitSettings,
};
use fareclaim_core::models::config::{ConfirmationMode, FareclaimConfig};
use fareclaim_core::models::receipt::ParsedReceipt;
use fareclaim_core::pdf::PdfTextExtractor;
use fareclaim_core::receipt::{ReceiptCollection, ReceiptParser, ReceiptStore, ScanStatus};
use fareclaim_core::FormAgent;

use super::load_config;

/// Arguments for the submit command.
#[derive(Args)]
pub struct SubmitArgs {
    /// Directory containing receipt files
    #[arg(required = true)]
    directory: PathBuf,

    /// Fill in every form but stop before clicking submit
    #[arg(long)]
    dry_run: bool,

    /// Claim through the phone-linked page, selecting this number
    #[arg(long)]
    phone: Option<String>,

    /// How to confirm a claim before deleting its receipt
    #[arg(long, value_enum)]
    confirm: Option<ConfirmArg>,

    /// WebDriver server URL (overrides config)
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Run the browser without a window
    #[arg(long)]
    headless: bool,

    /// Write the batch summary as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConfirmArg {
    /// Ask on the console
    Prompt,
    /// Look for the success message on the portal
    Portal,
    /// Never delete receipts
    Decline,
}

impl From<ConfirmArg> for ConfirmationMode {
    fn from(arg: ConfirmArg) -> Self {
        match arg {
            ConfirmArg::Prompt => ConfirmationMode::Prompt,
            ConfirmArg::Portal => ConfirmationMode::Portal,
            ConfirmArg::Decline => ConfirmationMode::Decline,
        }
    }
}

pub async fn run(args: SubmitArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, &args);

    let kind = ClaimKind::for_portal(&config.portal);
    if config.portal_url(&kind).trim().is_empty() {
        let key = match kind {
            ClaimKind::Standard => "portal.claims_url",
            ClaimKind::Mobile { .. } => "portal.mobile_url",
        };
        anyhow::bail!(
            "No portal URL configured. Run 'fareclaim config set {} <url>' first.",
            key
        );
    }

    let store = ReceiptStore::new(
        ReceiptParser::new(PdfTextExtractor::new()),
        config.scan.extension.clone(),
    );
    let scan = store.scan(&args.directory)?;
    if scan.status == ScanStatus::DirectoryNotFound {
        anyhow::bail!("Receipts directory not found: {}", scan.directory.display());
    }

    let claimable = scan.receipts.iter().filter(|r| r.amount().is_resolved()).count();
    if claimable == 0 {
        println!(
            "{} No receipts with a readable amount in {}",
            style("ℹ").blue(),
            scan.directory.display()
        );
        return Ok(());
    }

    println!(
        "{} Submitting {} of {} receipts{}",
        style("ℹ").blue(),
        claimable,
        scan.receipts.len(),
        if config.submission.dry_run { " (dry run)" } else { "" }
    );

    let receipts = scan.receipts;
    let summary =
        tokio::task::spawn_blocking(move || submit_batch(&config, &kind, &receipts)).await??;

    print_outcomes(&summary);

    if let Some(report_path) = &args.report {
        fs::write(report_path, serde_json::to_string_pretty(&summary)?)?;
        println!(
            "{} Report written to {}",
            style("✓").green(),
            report_path.display()
        );
    }

    println!();
    println!(
        "{} Finished {} attempts in {:?}",
        style("✓").green(),
        summary.attempts.len(),
        start.elapsed()
    );
    println!(
        "   {} deleted, {} retained, {} held, {} aborted, {} skipped",
        style(summary.deleted()).green(),
        style(summary.retained()).yellow(),
        style(summary.held()).cyan(),
        style(summary.aborted()).red(),
        summary.skipped.len()
    );

    Ok(())
}

fn apply_overrides(config: &mut FareclaimConfig, args: &SubmitArgs) {
    if args.dry_run {
        config.submission.dry_run = true;
    }
    if let Some(phone) = &args.phone {
        config.portal.phone_number = Some(phone.clone());
    }
    if let Some(confirm) = args.confirm {
        config.submission.confirmation = confirm.into();
    }
    if let Some(url) = &args.webdriver_url {
        config.browser.webdriver_url = url.clone();
    }
    if args.headless {
        config.browser.headless = true;
    }
}

/// Runs on a blocking thread: every agent call waits on the browser.
fn submit_batch(
    config: &FareclaimConfig,
    kind: &ClaimKind,
    receipts: &ReceiptCollection,
) -> anyhow::Result<BatchSummary> {
    let mut agent = WebDriverAgent::connect(&config.browser)?;
    let mut submitter = ClaimSubmitter::new(&mut agent, SubmitSettings::from(config));
    let mut confirmation = confirmation_source(config);

    debug!("Claim kind: {:?}", kind);
    let summary = run_claims(receipts, &mut submitter, kind, confirmation.as_mut());
    info!("Closing browser session");

    Ok(summary)
}

fn confirmation_source(config: &FareclaimConfig) -> Box<dyn ConfirmationSource> {
    let submission = &config.submission;
    match submission.confirmation {
        ConfirmationMode::Prompt => Box::new(ConsolePrompt::new()),
        ConfirmationMode::Portal => Box::new(PortalKeywordVerifier::new(
            submission.success_keyword.clone(),
            submission.timeout(),
        )),
        ConfirmationMode::Decline => Box::new(Decline),
    }
}

/// Asks the operator whether each submitted claim went through.
struct ConsolePrompt {
    term: Term,
}

impl ConsolePrompt {
    fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl ConfirmationSource for ConsolePrompt {
    fn confirm(&mut self, receipt: &ParsedReceipt, _agent: &mut dyn FormAgent) -> Confirmation {
        let question = format!(
            "{} Claim for {} ({}) submitted. Did it go through? Delete the receipt? [y/N] ",
            style("?").yellow(),
            receipt.file_path().display(),
            receipt.amount()
        );
        if self.term.write_str(&question).is_err() {
            return Confirmation::Absent;
        }

        match self.term.read_line() {
            Ok(answer) => parse_answer(&answer),
            Err(_) => Confirmation::Absent,
        }
    }
}

fn parse_answer(answer: &str) -> Confirmation {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Confirmation::Affirmed,
        "" => Confirmation::Absent,
        _ => Confirmation::Declined,
    }
}

fn phase_label(phase: ClaimPhase, held: bool) -> StyledObject<String> {
    if held {
        return style("held (dry run)".to_string()).cyan();
    }
    let label = phase.to_string();
    match phase {
        ClaimPhase::Deleted => style(label).green(),
        ClaimPhase::Retained => style(label).yellow(),
        ClaimPhase::Aborted => style(label).red(),
        _ => style(label),
    }
}

fn print_outcomes(summary: &BatchSummary) {
    println!();
    for attempt in &summary.attempts {
        let name = attempt
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| attempt.path.display().to_string());

        println!(
            "  {:<40} {:>10}  {}",
            name,
            attempt.amount,
            phase_label(attempt.phase, attempt.dry_run)
        );
        if let Some(error) = &attempt.error {
            println!("    {}", style(error).dim());
        }
    }

    for path in &summary.skipped {
        println!("  {:<40} {:>10}  {}", path.display(), "-", style("skipped").dim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("y\n"), Confirmation::Affirmed);
        assert_eq!(parse_answer(" YES "), Confirmation::Affirmed);
        assert_eq!(parse_answer("n"), Confirmation::Declined);
        assert_eq!(parse_answer("maybe"), Confirmation::Declined);
        assert_eq!(parse_answer(""), Confirmation::Absent);
    }

    #[test]
    fn test_overrides() {
        let args = SubmitArgs {
            directory: PathBuf::from("receipts"),
            dry_run: true,
            phone: Some("9876543210".to_string()),
            confirm: Some(ConfirmArg::Decline),
            webdriver_url: Some("http://localhost:4444".to_string()),
            headless: false,
            report: None,
        };
        let mut config = FareclaimConfig::default();

        apply_overrides(&mut config, &args);

        assert!(config.submission.dry_run);
        assert_eq!(config.submission.confirmation, ConfirmationMode::Decline);
        assert_eq!(config.browser.webdriver_url, "http://localhost:4444");
        assert!(!config.browser.headless);
        assert_eq!(
            ClaimKind::for_portal(&config.portal),
            ClaimKind::Mobile {
                phone_number: "9876543210".to_string()
            }
        );
    }
}
