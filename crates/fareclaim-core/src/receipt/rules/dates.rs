//! Ride time normalization.

use chrono::NaiveDateTime;

use super::patterns::{ORDINAL_SUFFIX, WHITESPACE_RUN};

const FORMATS: [&str; 2] = ["%b %d %Y, %I:%M %p", "%b %d %Y, %H:%M"];

/// Interpret a ride time token such as `"JAN 5th 2024, 10:30 AM"`.
///
/// Accepts abbreviated or full month names (any case), an optional ordinal
/// suffix on the day, and 12- or 24-hour clocks. Returns `None` when the
/// token does not describe a real date.
pub fn normalize_ride_time(raw: &str) -> Option<NaiveDateTime> {
    let collapsed = WHITESPACE_RUN.replace_all(raw.trim(), " ");
    let without_ordinal = ORDINAL_SUFFIX.replace_all(&collapsed, "$1");

    // Month names are matched on their first three letters ("SEPT", "January")
    let (month, rest) = without_ordinal.split_once(' ')?;
    let month: String = month.chars().take(3).collect();
    let candidate = format!("{} {}", month, rest);

    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&candidate, format).ok())
}
