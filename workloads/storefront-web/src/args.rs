//! Coercion of values handed in by page scripts.

use std::time::Duration;

/// `durationMs` for `showAlert`. Missing, negative or non-finite values
/// mean the default lifetime.
pub fn alert_duration(ms: Option<f64>) -> Option<Duration> {
    ms.filter(|ms| ms.is_finite() && *ms >= 0.0)
        .map(|ms| Duration::from_millis(ms as u64))
}

/// `count` for `updateCartBadge`. `None` asks the server instead.
pub fn badge_count(count: Option<f64>) -> Option<u32> {
    count
        .filter(|c| c.is_finite() && *c >= 0.0)
        .map(|c| c.min(u32::MAX as f64) as u32)
}

/// Amount for `formatPrice`: a number, or numeric text.
pub fn price_amount(number: Option<f64>, text: Option<&str>) -> Option<f64> {
    number
        .or_else(|| text.and_then(|t| t.trim().parse().ok()))
        .filter(|amount| amount.is_finite())
}
