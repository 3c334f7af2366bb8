//! Rule-based field extractors for ride receipts.

pub mod amounts;
pub mod dates;
pub mod patterns;
pub mod trip;

pub use amounts::{extract_amount, AmountExtractor};
pub use dates::normalize_ride_time;
pub use trip::{extract_trip, clean_address, TripDetails, TripExtractor};
pub use patterns::*;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// An extracted value and the byte range of the text it was read from.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    pub value: T,
    pub position: (usize, usize),
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, start: usize, end: usize) -> Self {
        Self {
            value,
            position: (start, end),
        }
    }
}
