//! Directory scanning and the receipt collection.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::FareclaimError;
use crate::models::receipt::{Amount, ParsedReceipt, ReceiptRecord};
use crate::pdf::TextExtractor;

use super::parser::ReceiptParser;

/// Receipts from one directory scan, keyed by absolute file path.
#[derive(Debug, Clone, Default)]
pub struct ReceiptCollection {
    receipts: BTreeMap<PathBuf, ParsedReceipt>,
}

impl ReceiptCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a receipt, replacing any receipt with the same path.
    pub fn insert(&mut self, receipt: ParsedReceipt) -> Option<ParsedReceipt> {
        self.receipts.insert(receipt.file_path().to_path_buf(), receipt)
    }

    pub fn get(&self, path: &Path) -> Option<&ParsedReceipt> {
        self.receipts.get(path)
    }

    pub fn len(&self) -> usize {
        self.receipts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }

    /// Receipts in scan order (ascending path).
    pub fn iter(&self) -> impl Iterator<Item = &ParsedReceipt> {
        self.receipts.values()
    }

    /// Receipts, most recent ride first.
    ///
    /// Receipts without a usable ride time come after all dated ones, in
    /// scan order. Receipts with equal times also keep scan order.
    pub fn ordered_by_recency(&self) -> Vec<&ParsedReceipt> {
        let mut ordered: Vec<&ParsedReceipt> = self.iter().collect();
        // `None` < `Some`, so reversing the comparison puts undated receipts last
        ordered.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
        ordered
    }

    /// Flat records, most recent ride first.
    pub fn records(&self) -> Vec<ReceiptRecord> {
        self.ordered_by_recency()
            .into_iter()
            .map(ReceiptRecord::from)
            .collect()
    }

    /// Counts of receipts by amount outcome.
    pub fn summary(&self) -> ScanSummary {
        let mut summary = ScanSummary::default();
        for receipt in self.iter() {
            summary.total += 1;
            match receipt.amount() {
                Amount::Resolved(_) => summary.resolved += 1,
                Amount::Unresolved => summary.unresolved += 1,
                Amount::Malformed => summary.errored += 1,
            }
        }
        summary
    }
}

/// Receipt counts by amount outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub total: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub errored: usize,
}

/// Whether the scanned directory existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Scanned,
    DirectoryNotFound,
}

/// Result of scanning a directory.
#[derive(Debug, Clone)]
pub struct DirectoryScan {
    pub directory: PathBuf,
    pub status: ScanStatus,
    pub receipts: ReceiptCollection,
}

/// Scans directories for receipt documents.
pub struct ReceiptStore<E> {
    parser: ReceiptParser<E>,
    extension: String,
}

impl<E: TextExtractor> ReceiptStore<E> {
    /// Create a store that parses files ending in `extension` (without dot).
    pub fn new(parser: ReceiptParser<E>, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self {
            parser,
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Parse every receipt file directly inside `directory`.
    ///
    /// A missing directory is not an error: it yields an empty collection
    /// with [`ScanStatus::DirectoryNotFound`]. Files are visited in path
    /// order so repeated scans produce identical output.
    pub fn scan(&self, directory: &Path) -> Result<DirectoryScan, FareclaimError> {
        let directory = std::path::absolute(directory)?;

        let entries = match fs::read_dir(&directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Receipts directory not found: {}", directory.display());
                return Ok(DirectoryScan {
                    directory,
                    status: ScanStatus::DirectoryNotFound,
                    receipts: ReceiptCollection::new(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", directory.display(), e);
                    None
                }
            })
            .filter(|path| path.is_file() && self.accepts(path))
            .collect();
        files.sort();

        let mut receipts = ReceiptCollection::new();
        for path in files {
            debug!("Parsing {}", path.display());
            receipts.insert(self.parser.parse(&path));
        }

        let summary = receipts.summary();
        info!(
            resolved = summary.resolved,
            unresolved = summary.unresolved,
            errored = summary.errored,
            "Scanned {} receipts in {}",
            summary.total,
            directory.display()
        );

        Ok(DirectoryScan {
            directory,
            status: ScanStatus::Scanned,
            receipts,
        })
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension))
    }
}
