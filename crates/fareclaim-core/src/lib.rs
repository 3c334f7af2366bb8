//! Core library for ride receipt claims.
//!
//! This crate provides:
//! - PDF text extraction for ride receipts
//! - Receipt field extraction (fare, ride time, pickup and drop addresses)
//! - Directory scanning into a recency-ordered receipt collection
//! - A browser form agent abstraction with a WebDriver backend
//! - The claim submission state machine and batch orchestration

pub mod agent;
pub mod claim;
pub mod error;
pub mod models;
pub mod pdf;
pub mod receipt;

pub use agent::{FormAgent, Locator};
#[cfg(feature = "webdriver")]
pub use agent::WebDriverAgent;
pub use claim::{
    run_claims, AttemptReport, BatchSummary, ClaimAttempt, ClaimKind, ClaimPhase, ClaimSubmitter,
    Confirmation, ConfirmationSource, Decline, PortalKeywordVerifier, SubmitSettings,
};
pub use error::{AgentError, ClaimError, FareclaimError, PdfError, Result};
pub use models::{Amount, FareclaimConfig, OccurredAt, ParsedReceipt, ReceiptRecord};
pub use pdf::{PdfTextExtractor, TextExtractor};
pub use receipt::{DirectoryScan, ReceiptCollection, ReceiptParser, ReceiptStore, ScanStatus, ScanSummary};
