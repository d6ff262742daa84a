//! Ticket Text - display formatting for hall-ticket fields
//!
//! This crate provides:
//! - Date canonicalization (ISO, day-first numeric, month names, spreadsheet serials)
//! - Time canonicalization (24h, 12h with AM/PM, time ranges)
//! - Amount formatting with thousand separators
//! - Width-driven line breaking
//!
//! Every `format_*` function is strict and returns an error for input it
//! cannot canonicalize. The `display_*` variants never fail: they fall back
//! to the trimmed input so a bad upstream value is printed as-is rather than
//! replaced by a guess.
//!
//! # Example
//!
//! ```
//! use ticket_text::{display_date, display_time, wrap_to_width};
//!
//! assert_eq!(display_date("2025-03-15"), "15 Mar 2025");
//! assert_eq!(display_time("14:30"), "02:30 PM");
//!
//! let lines = wrap_to_width("one two three", 8.0, |s| s.chars().count() as f64);
//! assert_eq!(lines, vec!["one two", "three"]);
//! ```

mod datetime;
mod linebreak;
mod number;

pub use datetime::{
    display_date, display_time, format_date, format_time, parse_date, parse_time,
    DATE_DISPLAY_FORMAT, TIME_DISPLAY_FORMAT,
};
pub use linebreak::{break_word, wrap_to_width};
pub use number::{display_amount, format_amount, render_float};

use thiserror::Error;

/// Errors that can occur while canonicalizing display text
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}

/// Result type for text operations
pub type Result<T> = std::result::Result<T, TextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_fallbacks() {
        assert_eq!(display_date("not a date"), "not a date");
        assert_eq!(display_time("after lunch"), "after lunch");
        assert_eq!(display_amount("waived", "Rs. "), "waived");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            format_date("31/02/2025").unwrap_err().to_string(),
            "Invalid date: 31/02/2025"
        );
    }
}
