//! Amount formatting

use crate::{Result, TextError};

/// Pattern used for fees: grouped thousands, two decimals
const AMOUNT_PATTERN: &str = "#,##0.00";

/// Parsed shape of a numeric pattern such as "#,###.##"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NumberPattern {
    precision: usize,
    grouping: bool,
}

impl NumberPattern {
    fn parse(pattern: &str) -> Self {
        let (int_part, frac_part) = match pattern.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (pattern, ""),
        };

        Self {
            precision: frac_part.chars().filter(|c| matches!(c, '#' | '0')).count(),
            grouping: int_part.contains(','),
        }
    }
}

/// Render a number with a pattern
///
/// `,` in the integer part turns on thousands grouping; the count of `#`/`0`
/// after the `.` sets the number of decimals.
///
/// # Examples
/// ```
/// use ticket_text::render_float;
/// assert_eq!(render_float("#,###.##", 1234.5), "1,234.50");
/// assert_eq!(render_float("#", 1234.6), "1235");
/// ```
pub fn render_float(pattern: &str, n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let pattern = NumberPattern::parse(pattern);
    let fixed = format!("{:.*}", pattern.precision, n.abs());
    let (int_digits, frac_digits) = match fixed.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (fixed.clone(), None),
    };

    let int_text = if pattern.grouping {
        group_thousands(&int_digits)
    } else {
        int_digits
    };

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    let sign = if n < 0.0 && !is_zero { "-" } else { "" };

    match frac_digits {
        Some(frac) => format!("{sign}{int_text}.{frac}"),
        None => format!("{sign}{int_text}"),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Format a fee such as "1500" as "Rs. 1,500.00"
///
/// Accepts input that already carries the prefix or grouping separators,
/// so formatting is idempotent.
pub fn format_amount(raw: &str, prefix: &str) -> Result<String> {
    let text = raw.trim();
    let marker = prefix.trim();
    let unprefixed = if !marker.is_empty() {
        text.strip_prefix(marker).unwrap_or(text)
    } else {
        text
    };
    let digits: String = unprefixed
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    let value: f64 = digits
        .parse()
        .map_err(|_| TextError::InvalidNumber(text.to_string()))?;
    if !value.is_finite() {
        return Err(TextError::InvalidNumber(text.to_string()));
    }

    Ok(format!("{prefix}{}", render_float(AMOUNT_PATTERN, value)))
}

/// Format a fee, falling back to the trimmed input
pub fn display_amount(raw: &str, prefix: &str) -> String {
    format_amount(raw, prefix).unwrap_or_else(|_| raw.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_float() {
        assert_eq!(render_float("#,###.##", 1234.56), "1,234.56");
        assert_eq!(render_float("#,###.##", 1000000.0), "1,000,000.00");
        assert_eq!(render_float("#,###.##", -100.5), "-100.50");
        assert_eq!(render_float("#,###", 999.0), "999");
        assert_eq!(render_float("0.0", 0.04), "0.0");
    }

    #[test]
    fn test_render_float_special() {
        assert_eq!(render_float("", f64::NAN), "NaN");
        assert_eq!(render_float("", f64::INFINITY), "Infinity");
        assert_eq!(render_float("", f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_render_float_negative_zero() {
        assert_eq!(render_float("#.##", -0.001), "0.00");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("1000000"), "1,000,000");
        assert_eq!(group_thousands("100"), "100");
        assert_eq!(group_thousands("0"), "0");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount("1500", "Rs. ").unwrap(), "Rs. 1,500.00");
        assert_eq!(format_amount(" 750.5 ", "").unwrap(), "750.50");
        assert_eq!(format_amount("1,200", "Rs. ").unwrap(), "Rs. 1,200.00");
    }

    #[test]
    fn test_format_amount_idempotent() {
        let once = format_amount("1250000", "Rs. ").unwrap();
        assert_eq!(once, "Rs. 1,250,000.00");
        assert_eq!(format_amount(&once, "Rs. ").unwrap(), once);
    }

    #[test]
    fn test_format_amount_invalid() {
        assert!(format_amount("waived", "Rs. ").is_err());
        assert!(format_amount("", "Rs. ").is_err());
        assert!(format_amount("inf", "").is_err());
        assert_eq!(display_amount(" N/A ", "Rs. "), "N/A");
    }
}
