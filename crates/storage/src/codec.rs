//! Conversions between the text found on result pages / in the history file
//! and the canonical values stored on a [`crate::models::ResultRow`].

use chrono::NaiveDate;

use crate::error::ParseError;

/// Run dates are always day/month/year, regardless of locale.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Parses a race time into whole seconds.
///
/// Accepts `MM:SS`. Some result pages render times as `MM:SS:00`; a trailing
/// `:00` third group is dropped before parsing. This is not an hour parser:
/// `1:02:03` is rejected and `1:02:00` reads as 62 seconds.
///
/// ```
/// use storage::codec::parse_time;
///
/// assert_eq!(parse_time("22:58").unwrap(), 1378);
/// assert_eq!(parse_time("24:02:00").unwrap(), 1442);
/// assert!(parse_time("bad").is_err());
/// ```
pub fn parse_time(raw: &str) -> Result<u32, ParseError> {
    let invalid = || ParseError::InvalidTime(raw.to_string());

    let mut parts: Vec<&str> = raw.trim().split(':').collect();
    if parts.len() == 3 && parts[2] == "00" {
        parts.pop();
    }

    let [minutes, seconds] = parts.as_slice() else {
        return Err(invalid());
    };

    let minutes = parse_digits(minutes).ok_or_else(invalid)?;
    let seconds = parse_digits(seconds).ok_or_else(invalid)?;
    if seconds >= 60 {
        return Err(invalid());
    }

    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(invalid)
}

/// Renders seconds as `M:SS` (minutes unpadded).
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| ParseError::InvalidDate(raw.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses a run number or finishing position. Thousands separators are
/// tolerated since large events print positions like `1,024`.
pub fn parse_number(field: &'static str, raw: &str) -> Result<u32, ParseError> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    parse_digits(&cleaned).ok_or_else(|| ParseError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
