//! Commerce error types.

use thiserror::Error;

/// Errors that can occur while interpreting storefront values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommerceError {
    /// Quantity text had no leading integer.
    #[error("Invalid quantity: {0:?}")]
    InvalidQuantity(String),

    /// Price text could not be read as a decimal amount.
    #[error("Invalid price: {0:?}")]
    InvalidPrice(String),

    /// Date text could not be parsed.
    #[error("Invalid date: {0:?}")]
    InvalidDate(String),
}
