//! Receipt parser turning document text into a [`ParsedReceipt`].

use std::path::Path;

use tracing::{debug, warn};

use crate::models::receipt::{Amount, ParsedReceipt};
use crate::pdf::TextExtractor;

use super::rules::{extract_amount, extract_trip};

/// Parses ride receipts using a [`TextExtractor`] for the document text.
pub struct ReceiptParser<E> {
    extractor: E,
}

impl<E: TextExtractor> ReceiptParser<E> {
    /// Create a parser backed by the given extractor.
    pub fn new(extractor: E) -> Self {
        Self { extractor }
    }

    /// Parse the receipt at `path`.
    ///
    /// This never fails: a document that cannot be read becomes a receipt
    /// with a [`Amount::Malformed`] amount and the cause in `source`, so one
    /// corrupt file does not stop a directory scan.
    pub fn parse(&self, path: &Path) -> ParsedReceipt {
        let pages = match self.extractor.extract_pages(path) {
            Ok(pages) => pages,
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                return ParsedReceipt::malformed(path, e);
            }
        };

        let mut text = String::new();
        for page in &pages {
            text.push_str(page);
            text.push('\n');
        }

        parse_receipt_text(path, &text)
    }
}

/// Build a receipt for `path` from already extracted document text.
///
/// The fare and the trip block are matched independently; either may be
/// missing without affecting the other.
pub fn parse_receipt_text(path: &Path, text: &str) -> ParsedReceipt {
    let amount = match extract_amount(text) {
        Some(value) => Amount::Resolved(value),
        None => Amount::Unresolved,
    };

    let trip = extract_trip(text);

    debug!(
        "Parsed {}: amount={}, trip block {}",
        path.display(),
        amount,
        if trip.is_some() { "found" } else { "missing" }
    );

    match trip {
        Some(trip) => ParsedReceipt::new(
            path,
            amount,
            Some(trip.occurred_at),
            Some(trip.source),
            Some(trip.destination),
        ),
        None => ParsedReceipt::new(path, amount, None, None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfError;
    use crate::pdf;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Serves canned page text per path; unknown paths fail like a corrupt file.
    struct CannedPages(HashMap<PathBuf, Vec<String>>);

    impl TextExtractor for CannedPages {
        fn extract_pages(&self, path: &Path) -> pdf::Result<Vec<String>> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| PdfError::Parse("invalid file header".to_string()))
        }
    }

    fn canned(path: &str, pages: &[&str]) -> ReceiptParser<CannedPages> {
        let mut map = HashMap::new();
        map.insert(
            PathBuf::from(path),
            pages.iter().map(|p| p.to_string()).collect(),
        );
        ReceiptParser::new(CannedPages(map))
    }

    #[test]
    fn test_parse_full_receipt() {
        let parser = canned(
            "/receipts/ride.pdf",
            &[
                "Time of Ride\nJAN 5th 2024, 10:30 AM\nSelected Price ₹100\nFlat 12, Lake View Road,\nMumbai 400069",
                "Gateway of India, Colaba,\nMumbai 400001 This document is issued by the platform.",
            ],
        );

        let receipt = parser.parse(Path::new("/receipts/ride.pdf"));

        assert_eq!(receipt.amount(), Amount::Resolved(Decimal::from(100)));
        assert_eq!(receipt.amount().to_string(), "100");
        assert_eq!(receipt.occurred_at().unwrap().raw(), "JAN 5th 2024, 10:30 AM");
        assert_eq!(receipt.source(), Some("Flat 12, Lake View Road, Mumbai 400069"));
        assert_eq!(receipt.destination(), Some("Gateway of India, Colaba, Mumbai 400001"));
    }

    #[test]
    fn test_extraction_failure_is_contained() {
        let parser = canned("/receipts/ride.pdf", &[]);

        let receipt = parser.parse(Path::new("/receipts/broken.pdf"));

        assert_eq!(receipt.amount(), Amount::Malformed);
        let cause = receipt.source().unwrap();
        assert!(cause.contains("invalid file header"));
        assert!(receipt.destination().is_none());
    }

    #[test]
    fn test_amount_without_trip_block() {
        let receipt = parse_receipt_text(
            Path::new("/receipts/partial.pdf"),
            "Selected Price ₹75\nPickup and drop details unavailable",
        );

        assert_eq!(receipt.amount(), Amount::Resolved(Decimal::from(75)));
        assert!(receipt.occurred_at().is_none());
        assert!(receipt.source().is_none());
        assert!(receipt.destination().is_none());
    }

    #[test]
    fn test_trip_block_without_amount() {
        let receipt = parse_receipt_text(
            Path::new("/receipts/nofare.pdf"),
            "MAY 2nd 2024, 6:45 PM\nHome 110001\nOffice 110020\nThis document is issued",
        );

        assert_eq!(receipt.amount(), Amount::Unresolved);
        assert_eq!(receipt.source(), Some("Home 110001"));
        assert_eq!(receipt.destination(), Some("Office 110020"));
    }

    #[test]
    fn test_empty_document() {
        let receipt = parse_receipt_text(Path::new("/receipts/blank.pdf"), "");
        assert_eq!(receipt.amount(), Amount::Unresolved);
        assert!(receipt.occurred_at().is_none());
    }
}
