//! Receipt extraction: parsing rules, the parser, and directory scanning.

mod parser;
pub mod rules;
mod store;

pub use parser::{parse_receipt_text, ReceiptParser};
pub use store::{DirectoryScan, ReceiptCollection, ReceiptStore, ScanStatus, ScanSummary};
