//! Selected-subtotal aggregation.

use crate::money::{Currency, Money};

/// The displayed total of one cart row and whether the row is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowTotal {
    /// Line total text as rendered (e.g. "₹120.00"); `None` if the row has
    /// no total element.
    pub text: Option<String>,
    /// Whether the row currently carries the selected marker.
    pub selected: bool,
}

impl RowTotal {
    /// A selected row showing `text`.
    pub fn selected(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            selected: true,
        }
    }

    /// An unselected row showing `text`.
    pub fn unselected(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            selected: false,
        }
    }
}

/// View-side aggregate over the selected cart rows.
///
/// Not authoritative: it is recomputed from whatever the page shows and may
/// briefly disagree with the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSummary {
    /// Number of selected rows, counted whether or not their total parsed.
    pub selected_rows: usize,
    /// Selected rows whose total could not be read.
    pub skipped_rows: usize,
    /// Sum of the parseable selected totals.
    pub total: Money,
}

impl SelectionSummary {
    /// Aggregate selected rows; unparseable totals contribute nothing.
    pub fn from_rows<'a>(rows: impl Iterator<Item = &'a RowTotal>, currency: Currency) -> Self {
        let mut summary = Self {
            selected_rows: 0,
            skipped_rows: 0,
            total: Money::zero(currency),
        };
        for row in rows.filter(|r| r.selected) {
            summary.selected_rows += 1;
            let parsed = row
                .text
                .as_deref()
                .and_then(|text| Money::parse_display(text, currency).ok())
                .and_then(|amount| summary.total.try_add(&amount));
            match parsed {
                Some(total) => summary.total = total,
                None => summary.skipped_rows += 1,
            }
        }
        summary
    }

    /// Whether any row is selected (enables the negotiate action).
    pub fn has_selection(&self) -> bool {
        self.selected_rows > 0
    }
}
