//! Ride time and pickup/drop address extraction.

use super::dates::normalize_ride_time;
use super::patterns::{LINE_BREAK, SELECTED_PRICE_FRAGMENT, TRIP_BLOCK};
use super::{ExtractionMatch, FieldExtractor};
use tracing::trace;
use crate::models::receipt::OccurredAt;

/// Ride time and route printed on a receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripDetails {
    pub occurred_at: OccurredAt,
    pub source: String,
    pub destination: String,
}

/// Extracts the ride time / pickup / drop block that precedes the legal trailer.
pub struct TripExtractor;

impl TripExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TripExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TripExtractor {
    type Output = ExtractionMatch<TripDetails>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        TRIP_BLOCK
            .captures_iter(text)
            .filter_map(|caps| {
                let raw_time = flatten(caps.get(1)?.as_str());
                let source = clean_address(caps.get(2)?.as_str());
                let destination = flatten(caps.get(3)?.as_str());
                let full_match = caps.get(0)?;

                let timestamp = normalize_ride_time(&raw_time);
                let details = TripDetails {
                    occurred_at: OccurredAt::new(raw_time, timestamp),
                    source,
                    destination,
                };
                Some(ExtractionMatch::new(details, full_match.start(), full_match.end()))
            })
            .collect()
    }
}

/// The first trip block in the text, if any.
pub fn extract_trip(text: &str) -> Option<TripDetails> {
    let found = TripExtractor::new().extract(text)?;
    trace!("Trip block at bytes {:?}", found.position);
    Some(found.value)
}

/// Flatten a wrapped pickup address and drop any fare fragment that the
/// lazy capture picked up from the line above it.
pub fn clean_address(raw: &str) -> String {
    let flat = flatten(raw);
    SELECTED_PRICE_FRAGMENT
        .replace_all(&flat, "")
        .trim()
        .to_string()
}

fn flatten(raw: &str) -> String {
    LINE_BREAK.replace_all(raw, " ").trim().to_string()
}
