//! Batch submission over a scanned receipt collection.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use crate::agent::FormAgent;
use crate::models::receipt::{Amount, ParsedReceipt};
use crate::receipt::{ReceiptCollection, ScanSummary};

use super::confirmation::ConfirmationSource;
use super::state::{ClaimAttempt, ClaimPhase};
use super::submitter::{ClaimKind, ClaimSubmitter};

/// Terminal state of one attempt, detached from the receipt it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptReport {
    pub path: PathBuf,
    pub amount: String,
    pub phase: ClaimPhase,
    /// Stopped before submit because of dry-run mode.
    pub dry_run: bool,
    pub deletion_confirmed: bool,
    pub error: Option<String>,
}

impl From<&ClaimAttempt<'_>> for AttemptReport {
    fn from(attempt: &ClaimAttempt<'_>) -> Self {
        Self {
            path: attempt.receipt().file_path().to_path_buf(),
            amount: attempt.receipt().amount().to_string(),
            phase: attempt.phase(),
            dry_run: attempt.held_for_dry_run(),
            deletion_confirmed: attempt.deletion_confirmed(),
            error: attempt.failure().map(|e| e.to_string()),
        }
    }
}

/// Outcome of a [`run_claims`] batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub receipts: ScanSummary,
    /// Receipts left out because their amount was not resolved.
    pub skipped: Vec<PathBuf>,
    pub attempts: Vec<AttemptReport>,
}

impl BatchSummary {
    fn count(&self, phase: ClaimPhase) -> usize {
        self.attempts.iter().filter(|a| a.phase == phase).count()
    }

    /// Attempts the portal received.
    pub fn submitted(&self) -> usize {
        self.deleted() + self.retained()
    }

    pub fn deleted(&self) -> usize {
        self.count(ClaimPhase::Deleted)
    }

    pub fn retained(&self) -> usize {
        self.count(ClaimPhase::Retained)
    }

    pub fn aborted(&self) -> usize {
        self.count(ClaimPhase::Aborted)
    }

    pub fn held(&self) -> usize {
        self.attempts.iter().filter(|a| a.dry_run).count()
    }
}

/// Submit every claimable receipt, most recent ride first.
///
/// Receipts are handled one after another; a failed attempt does not stop
/// the batch.
pub fn run_claims<A: FormAgent>(
    receipts: &ReceiptCollection,
    submitter: &mut ClaimSubmitter<'_, A>,
    kind: &ClaimKind,
    confirmation: &mut dyn ConfirmationSource,
) -> BatchSummary {
    let mut summary = BatchSummary {
        receipts: receipts.summary(),
        ..BatchSummary::default()
    };

    let queue: Vec<&ParsedReceipt> = receipts
        .ordered_by_recency()
        .into_iter()
        .filter(|receipt| match receipt.amount() {
            Amount::Resolved(_) => true,
            Amount::Unresolved => {
                info!("Skipping {}: no amount found", receipt.file_path().display());
                summary.skipped.push(receipt.file_path().to_path_buf());
                false
            }
            Amount::Malformed => {
                warn!("Skipping {}: {}", receipt.file_path().display(), receipt.source().unwrap_or_default());
                summary.skipped.push(receipt.file_path().to_path_buf());
                false
            }
        })
        .collect();

    info!("Submitting {} claims ({} skipped)", queue.len(), summary.skipped.len());

    for (index, receipt) in queue.iter().enumerate() {
        info!("[{}/{}] {}", index + 1, queue.len(), receipt.file_path().display());
        let attempt = submitter.submit(receipt, kind, confirmation);
        summary.attempts.push(AttemptReport::from(&attempt));
    }

    info!(
        deleted = summary.deleted(),
        retained = summary.retained(),
        aborted = summary.aborted(),
        held = summary.held(),
        "Batch finished"
    );

    summary
}
