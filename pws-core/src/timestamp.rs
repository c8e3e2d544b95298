//! Best-effort timestamp normalization shared by all dialects.
//!
//! Stations report date and time as loose text tokens. A timestamp that
//! parses is re-emitted as [`DISPLAY_FORMAT`]; one that does not is kept as
//! text, so a reading never loses its timestamp just because the station
//! uses an unexpected layout.

use chrono::NaiveDateTime;
use tracing::debug;

/// Layout of every timestamp that parsed successfully.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `dd-mm-yy` first so a four digit year never gets read as year 20.
pub const DAY_FIRST_PATTERNS: &[&str] = &["%d-%m-%y %H:%M:%S", "%d-%m-%Y %H:%M:%S"];

pub const ISO_PATTERNS: &[&str] = &["%Y-%m-%d %H:%M:%S"];

/// Trim and turn `/` and `.` date separators into `-`.
pub fn normalize_separators(raw: &str) -> String {
    raw.trim().replace(['/', '.'], "-")
}

/// Strict parse against each pattern in order.
pub fn parse_strict(candidate: &str, patterns: &[&str]) -> Option<NaiveDateTime> {
    patterns
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(candidate, pattern).ok())
}

/// Format `candidate` if it matches one of `patterns`, otherwise use `fallback`.
pub fn normalize_or_else<F>(candidate: &str, patterns: &[&str], fallback: F) -> String
where
    F: FnOnce() -> String,
{
    match parse_strict(candidate, patterns) {
        Some(parsed) => parsed.format(DISPLAY_FORMAT).to_string(),
        None => {
            let raw = fallback();
            debug!(
                candidate,
                fallback = %raw,
                "Timestamp matched no known pattern, keeping raw text"
            );
            raw
        }
    }
}

/// Rewrite a `dd-mm-yy` date as `yyyy-mm-dd`, taking the century from
/// `current_year`.
///
/// A station reading from a different century than the caller's clock gets
/// the wrong year; there is no way to tell from two digits.
pub fn expand_two_digit_year(date: &str, current_year: i32) -> Option<String> {
    let mut parts = date.split('-');
    let (day, month, year) = (parts.next()?, parts.next()?, parts.next()?);
    let is_short_number = |s: &str, max: usize| {
        !s.is_empty() && s.len() <= max && s.chars().all(|c| c.is_ascii_digit())
    };
    if parts.next().is_some()
        || !is_short_number(day, 2)
        || !is_short_number(month, 2)
        || year.len() != 2
        || !is_short_number(year, 2)
    {
        return None;
    }

    let current = current_year.to_string();
    let century = current.get(..current.len().checked_sub(2)?)?;

    Some(format!("{century}{year}-{month}-{day}"))
}
