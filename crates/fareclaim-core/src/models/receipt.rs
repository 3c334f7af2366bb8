//! Receipt data models.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sentinel used in records for a field that was not found in the document.
pub const NOT_FOUND: &str = "Not Found";

/// Sentinel used in records for an amount that could not be read.
pub const ERROR: &str = "Error";

/// Outcome of amount extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {
    /// The fare shown on the receipt.
    Resolved(Decimal),
    /// The document was readable but carried no recognizable amount.
    Unresolved,
    /// The document could not be read.
    Malformed,
}

impl Amount {
    /// The resolved value, if any.
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Amount::Resolved(value) => Some(*value),
            Amount::Unresolved | Amount::Malformed => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Amount::Resolved(_))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Resolved(value) => write!(f, "{}", value),
            Amount::Unresolved => f.write_str(NOT_FOUND),
            Amount::Malformed => f.write_str(ERROR),
        }
    }
}

/// Format an amount the way the claims portal expects it: whole amounts
/// without a fraction, anything else with two decimal places.
pub fn format_claim_amount(amount: Decimal) -> String {
    if amount.fract().is_zero() {
        amount.trunc().normalize().to_string()
    } else {
        format!("{:.2}", amount)
    }
}

/// When the ride happened, as printed on the receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurredAt {
    raw: String,
    timestamp: Option<NaiveDateTime>,
}

impl OccurredAt {
    pub fn new(raw: impl Into<String>, timestamp: Option<NaiveDateTime>) -> Self {
        Self {
            raw: raw.into(),
            timestamp,
        }
    }

    /// The date token as captured from the document (whitespace collapsed).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized timestamp, `None` when the token could not be interpreted.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamp
    }
}

/// Structured data extracted from one receipt document.
///
/// The file path is the receipt's identity: equality and hashing only look at
/// it. Values are never modified after parsing; parsing the file again yields
/// a new receipt.
#[derive(Debug, Clone)]
pub struct ParsedReceipt {
    file_path: PathBuf,
    amount: Amount,
    occurred_at: Option<OccurredAt>,
    source: Option<String>,
    destination: Option<String>,
}

impl ParsedReceipt {
    pub fn new(
        file_path: impl Into<PathBuf>,
        amount: Amount,
        occurred_at: Option<OccurredAt>,
        source: Option<String>,
        destination: Option<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            amount,
            occurred_at,
            source,
            destination,
        }
    }

    /// A receipt whose document could not be read. The cause is kept in
    /// `source` so it travels with the receipt.
    pub fn malformed(file_path: impl Into<PathBuf>, cause: impl fmt::Display) -> Self {
        Self::new(
            file_path,
            Amount::Malformed,
            None,
            Some(format!("File reading error: {}", cause)),
            None,
        )
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn occurred_at(&self) -> Option<&OccurredAt> {
        self.occurred_at.as_ref()
    }

    /// Timestamp used for ordering; `None` sorts after every real date.
    pub fn sort_key(&self) -> Option<NaiveDateTime> {
        self.occurred_at.as_ref().and_then(OccurredAt::timestamp)
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }
}

impl PartialEq for ParsedReceipt {
    fn eq(&self, other: &Self) -> bool {
        self.file_path == other.file_path
    }
}

impl Eq for ParsedReceipt {}

impl std::hash::Hash for ParsedReceipt {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.file_path.hash(state);
    }
}

/// Flat, string-only view of a receipt for external consumers.
///
/// Missing values are spelled out with [`NOT_FOUND`] / [`ERROR`] so consumers
/// can filter on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    pub path: String,
    pub amount: String,
    pub date: String,
    pub source: String,
    pub destination: String,
}

impl From<&ParsedReceipt> for ReceiptRecord {
    fn from(receipt: &ParsedReceipt) -> Self {
        let or_not_found = |value: Option<&str>| value.unwrap_or(NOT_FOUND).to_string();

        Self {
            path: receipt.file_path().display().to_string(),
            amount: receipt.amount().to_string(),
            date: or_not_found(receipt.occurred_at().map(OccurredAt::raw)),
            source: or_not_found(receipt.source()),
            destination: or_not_found(receipt.destination()),
        }
    }
}
