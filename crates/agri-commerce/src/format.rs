//! Lenient number parsing and date display.
//!
//! Attribute and field values on the page are free text. These helpers read
//! them the way the browser's `parseInt`/`parseFloat` do: skip leading
//! whitespace, then take the longest numeric prefix.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::CommerceError;
use crate::money::{Currency, Money};

/// Read a leading base-10 integer, e.g. `" 3 kg"` -> `Some(3)`.
///
/// Returns `None` when no digit follows the optional sign. Values beyond
/// the `i64` range saturate.
pub fn parse_int_prefix(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Read a leading decimal number, e.g. `"12.5abc"` -> `Some(12.5)`.
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return s[..end + "Infinity".len()].replace("Infinity", "inf").parse().ok();
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Display a rupee amount with Indian digit grouping, e.g. `₹12,34,567.50`.
pub fn format_price(amount: f64) -> String {
    Money::from_decimal(amount, Currency::INR).display_grouped()
}

/// Format a date string for display, e.g. `"2024-01-05"` -> `"Jan 5, 2024"`.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DD`, and `YYYY-MM-DD HH:MM:SS`
/// (with `T` or space separator, optional fractional seconds).
pub fn format_date(text: &str) -> Result<String, CommerceError> {
    let trimmed = text.trim();
    let date = if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        dt.date_naive()
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        dt.date()
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f") {
        dt.date()
    } else if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        d
    } else {
        return Err(CommerceError::InvalidDate(text.to_string()));
    };
    Ok(date.format("%b %-d, %Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Integer Tests ===

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("3"), Some(3));
        assert_eq!(parse_int_prefix("  12 kg"), Some(12));
        assert_eq!(parse_int_prefix("-2"), Some(-2));
        assert_eq!(parse_int_prefix("+7"), Some(7));
        assert_eq!(parse_int_prefix("2.9"), Some(2));
        assert_eq!(parse_int_prefix("0"), Some(0));
    }

    #[test]
    fn test_parse_int_prefix_rejects_non_numeric() {
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix(".5"), None);
    }

    // === Price Tests ===

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1234567.5), "\u{20b9}12,34,567.50");
        assert_eq!(format_price(0.0), "\u{20b9}0.00");
        assert_eq!(format_price(-5.0), "-\u{20b9}5.00");
    }

    // === Float Tests ===

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("100.00"), Some(100.0));
        assert_eq!(parse_float_prefix(" 50.5abc"), Some(50.5));
        assert_eq!(parse_float_prefix(".25"), Some(0.25));
        assert_eq!(parse_float_prefix("7."), Some(7.0));
        assert_eq!(parse_float_prefix("-3.5"), Some(-3.5));
        assert_eq!(parse_float_prefix("1e3"), Some(1000.0));
        assert_eq!(parse_float_prefix("2e"), Some(2.0));
    }

    #[test]
    fn test_parse_float_prefix_rejects_non_numeric() {
        assert_eq!(parse_float_prefix("bad"), None);
        assert_eq!(parse_float_prefix("."), None);
        assert_eq!(parse_float_prefix(""), None);
    }

    #[test]
    fn test_parse_float_prefix_infinity() {
        assert_eq!(parse_float_prefix("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_float_prefix("-Infinity"), Some(f64::NEG_INFINITY));
    }

    // === Date Tests ===

    #[test]
    fn test_format_date_plain() {
        assert_eq!(format_date("2024-01-05").unwrap(), "Jan 5, 2024");
    }

    #[test]
    fn test_format_date_with_time() {
        assert_eq!(format_date("2023-11-20 14:03:09").unwrap(), "Nov 20, 2023");
        assert_eq!(
            format_date("2023-11-20T14:03:09.123456").unwrap(),
            "Nov 20, 2023"
        );
        assert_eq!(
            format_date("2023-12-31T23:00:00+05:30").unwrap(),
            "Dec 31, 2023"
        );
    }

    #[test]
    fn test_format_date_invalid() {
        assert!(matches!(
            format_date("not a date"),
            Err(CommerceError::InvalidDate(_))
        ));
    }
}
