//! Display helpers exposed to page scripts.

use agri_commerce::format;

use crate::messages::INVALID_DATE;

/// `₹12,34,567.50` style price.
pub fn format_price(amount: f64) -> String {
    format::format_price(amount)
}

/// `Jan 5, 2024` style date, or `Invalid Date` when `text` is not a date.
pub fn format_date(text: &str) -> String {
    format::format_date(text).unwrap_or_else(|_| INVALID_DATE.to_string())
}
