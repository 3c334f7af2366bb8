//! Regex patterns for the ride receipt template.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Fare line, e.g. "Selected Price ₹100" or "Selected Price: Rs. 86.50"
    pub static ref SELECTED_PRICE: Regex = Regex::new(
        r"(?i)Selected Price\D*(\d+(?:\.\d+)?)"
    ).unwrap();

    // Fare line fragment that can leak into the pickup address capture
    pub static ref SELECTED_PRICE_FRAGMENT: Regex = Regex::new(
        r"(?i)Selected Price\s*[^\w\s]*\s*\d+(?:\.\d+)?\s*"
    ).unwrap();

    // Ride time, pickup address, drop address, then the legal trailer.
    // Addresses end in a 6-digit PIN code and may wrap across lines.
    pub static ref TRIP_BLOCK: Regex = Regex::new(concat!(
        r"(?is)",
        r"([A-Z]{3,9}\s+\d{1,2}(?:st|nd|rd|th)?\s+\d{4},\s*\d{1,2}:\d{2}\s*(?:AM|PM)?)",
        r"\s+(.*?\d{6}(?:,\s*India)?)",
        r"\s+(.*?\d{6}(?:,\s*India)?)",
        r"\s+This document is issued",
    )).unwrap();

    // Ordinal suffix on a day number: "5th" -> "5"
    pub static ref ORDINAL_SUFFIX: Regex = Regex::new(
        r"(?i)(\d)(?:st|nd|rd|th)\b"
    ).unwrap();

    // A line break together with the indentation around it
    pub static ref LINE_BREAK: Regex = Regex::new(
        r"\s*\n\s*"
    ).unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(
        r"\s+"
    ).unwrap();
}
