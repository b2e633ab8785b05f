//! AgriConnect storefront - browser entry point.
//!
//! Boots the interaction layer once the page's DOM is ready and exports
//! `window.AgriConnect` for inline page scripts:
//! - `showAlert(type, message, durationMs?)`
//! - `updateCartBadge(count?)`
//! - `formatPrice(amount)` / `formatDate(text)`
//! - `getCSRFToken()`

mod args;

#[cfg(target_arch = "wasm32")]
mod boot;
#[cfg(target_arch = "wasm32")]
mod surface;

pub use args::{alert_duration, badge_count, price_amount};
