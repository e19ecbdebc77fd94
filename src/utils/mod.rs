//! Utility functions shared by the clients and the wizard

use chrono::NaiveDate;

/// Storage form of a calendar day: `YYYY-MM-DD`
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Form the booking server expects: `DD/MM/YYYY`
pub const SUBMISSION_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse a `YYYY-MM-DD` calendar-day key
pub fn parse_date_key(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_KEY_FORMAT).ok()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Convert a calendar day to the server's `DD/MM/YYYY` form
pub fn submission_date(date: NaiveDate) -> String {
    date.format(SUBMISSION_DATE_FORMAT).to_string()
}

/// Long human form used in summaries, e.g. `Mon 10 June 2024`
pub fn display_date(date: NaiveDate) -> String {
    date.format("%a %-d %B %Y").to_string()
}

/// Truncate a string to at most `max_bytes` bytes, ensuring the cut lands on a
/// valid UTF-8 char boundary. Returns the longest prefix that fits.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
