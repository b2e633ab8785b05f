//! Money type for representing monetary values.
//!
//! Uses cents-based integer representation to avoid floating-point
//! precision issues when line totals are summed on the page.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CommerceError;
use crate::format::parse_float_prefix;

/// Display currency. The storefront prices everything in rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    INR,
}

impl Currency {
    /// Get the currency code (e.g., "INR").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::INR => "INR",
        }
    }

    /// Get the currency symbol (e.g., "₹").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::INR => "\u{20b9}",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        2
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// Amounts are stored in the smallest unit of the currency (paise for INR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit.
    pub amount_cents: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from cents.
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Create a Money value from a decimal amount.
    ///
    /// ```
    /// use agri_commerce::money::{Money, Currency};
    /// let price = Money::from_decimal(49.99, Currency::INR);
    /// assert_eq!(price.amount_cents, 4999);
    /// ```
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        let multiplier = 10_i64.pow(currency.decimal_places());
        let amount_cents = (amount * multiplier as f64).round() as i64;
        Self::new(amount_cents, currency)
    }

    /// Parse displayed price text such as `"₹1,250.50"`.
    ///
    /// The currency symbol and digit-grouping commas are ignored, then the
    /// longest leading decimal is read, so `"₹12.5 / kg"` parses as 12.50.
    pub fn parse_display(text: &str, currency: Currency) -> Result<Money, CommerceError> {
        let cleaned: String = text.replace(currency.symbol(), "").replace(',', "");
        let amount = parse_float_prefix(&cleaned)
            .filter(|v| v.is_finite())
            .ok_or_else(|| CommerceError::InvalidPrice(text.to_string()))?;
        Ok(Money::from_decimal(amount, currency))
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Format as a plain display string (e.g., "₹49.99").
    ///
    /// No digit grouping; the sign follows the symbol ("₹-5.00").
    pub fn display(&self) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let (whole, frac) = self.split_abs();
        format!("{}{}{}{}", self.currency.symbol(), sign, whole, frac)
    }

    /// Format with lakh/crore digit grouping (e.g., "₹12,34,567.50"): the
    /// last three digits, then pairs. Negative amounts lead with the sign
    /// ("-₹5.00").
    pub fn display_grouped(&self) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let (whole, frac) = self.split_abs();
        format!("{}{}{}{}", sign, self.currency.symbol(), group_indian(&whole), frac)
    }

    /// Whole units and the fractional suffix (including the dot) of |amount|.
    fn split_abs(&self) -> (String, String) {
        let places = self.currency.decimal_places();
        let abs = self.amount_cents.unsigned_abs();
        let divisor = 10_u64.pow(places);
        let frac = format!(".{:0width$}", abs % divisor, width = places as usize);
        ((abs / divisor).to_string(), frac)
    }

    /// Add another amount, or `None` on overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        self.amount_cents
            .checked_add(other.amount_cents)
            .map(|amount| Money::new(amount, self.currency))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let head_bytes = head.as_bytes();
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    for (i, b) in head_bytes.iter().enumerate() {
        if i > 0 && (head_bytes.len() - i) % 2 == 0 {
            out.push(',');
        }
        out.push(*b as char);
    }
    out.push(',');
    out.push_str(tail);
    out
}
