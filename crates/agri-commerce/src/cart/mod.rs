//! Shopping cart module.
//!
//! Client-side cart arithmetic: the selected-subtotal display aggregate and
//! quantity stepping. Line totals themselves are computed by the server.

mod quantity;
mod selection;

pub use quantity::{QuantityStepper, Step, DEFAULT_MAX_QUANTITY, MIN_QUANTITY};
pub use selection::{RowTotal, SelectionSummary};
