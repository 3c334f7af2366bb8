//! Data models and configuration.

pub mod config;
pub mod receipt;

pub use config::FareclaimConfig;
pub use receipt::{format_claim_amount, Amount, OccurredAt, ParsedReceipt, ReceiptRecord};
