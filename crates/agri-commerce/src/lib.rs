//! Storefront domain values for AgriConnect.
//!
//! This crate holds the pieces of commerce logic the browser layer needs
//! without talking to the server:
//!
//! - **Ids**: newtype identifiers for products, cart items and offers
//! - **Money**: cents-based amounts, INR display with Indian digit grouping
//! - **Cart**: selected-subtotal aggregation and quantity stepping
//! - **Format**: lenient number parsing and date display
//!
//! # Example
//!
//! ```rust
//! use agri_commerce::prelude::*;
//!
//! let rows = [
//!     RowTotal::selected("₹100.00"),
//!     RowTotal::selected("₹bad"),
//!     RowTotal::unselected("₹50.50"),
//! ];
//! let summary = SelectionSummary::from_rows(rows.iter(), Currency::INR);
//! assert_eq!(summary.total.display(), "₹100.00");
//! assert!(summary.has_selection());
//! ```

pub mod error;
pub mod format;
pub mod ids;
pub mod money;

pub mod cart;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::format::{format_date, format_price, parse_float_prefix, parse_int_prefix};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Cart
    pub use crate::cart::{
        QuantityStepper, RowTotal, SelectionSummary, Step, DEFAULT_MAX_QUANTITY, MIN_QUANTITY,
    };
}
