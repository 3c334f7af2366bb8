//! Fare extraction.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::trace;

use super::patterns::SELECTED_PRICE;
use super::{ExtractionMatch, FieldExtractor};

/// Extracts the "Selected Price" fare.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    /// Only the first "Selected Price" counts; if its number does not fit a
    /// `Decimal` the fare is unresolved.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        SELECTED_PRICE.captures(text).and_then(|caps| to_match(&caps))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        SELECTED_PRICE
            .captures_iter(text)
            .filter_map(|caps| to_match(&caps))
            .collect()
    }
}

fn to_match(caps: &regex::Captures<'_>) -> Option<ExtractionMatch<Decimal>> {
    let number = caps.get(1)?;
    let value = Decimal::from_str(number.as_str()).ok()?;
    let full_match = caps.get(0)?;
    Some(ExtractionMatch::new(value, full_match.start(), full_match.end()))
}

/// The first fare in the text, if any.
pub fn extract_amount(text: &str) -> Option<Decimal> {
    let found = AmountExtractor::new().extract(text)?;
    trace!("Fare {} at bytes {:?}", found.value, found.position);
    Some(found.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rupee_symbol() {
        assert_eq!(extract_amount("Selected Price ₹100"), Some(Decimal::from(100)));
    }

    #[test]
    fn test_case_insensitive_with_fraction() {
        assert_eq!(
            extract_amount("SELECTED PRICE: Rs. 86.50\nPaid via UPI"),
            Some(Decimal::from_str("86.50").unwrap())
        );
    }

    #[test]
    fn test_first_occurrence_wins() {
        let text = "Selected Price ₹120\nDiscount ₹20\nSelected Price ₹100";
        assert_eq!(extract_amount(text), Some(Decimal::from(120)));
        assert_eq!(AmountExtractor::new().extract_all(text).len(), 2);
        assert_eq!(AmountExtractor::new().extract(text).unwrap().position, (0, 21));
    }

    #[test]
    fn test_oversized_first_price_is_unresolved() {
        let text = format!("Selected Price ₹{}\nSelected Price ₹5", "9".repeat(32));
        assert_eq!(extract_amount(&text), None);
        assert_eq!(AmountExtractor::new().extract_all(&text).len(), 1);
    }

    #[test]
    fn test_price_across_line_break() {
        assert_eq!(extract_amount("Selected Price\n₹ 64"), Some(Decimal::from(64)));
    }

    #[test]
    fn test_missing_phrase() {
        assert_eq!(extract_amount("Total Fare ₹100"), None);
        assert_eq!(extract_amount(""), None);
    }
}
