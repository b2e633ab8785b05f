//! Cart count mirrored from the server.

use std::cell::Cell;
use std::fmt;

use crate::command::Command;
use crate::dispatcher::Dispatcher;
use crate::dom::Document;
use crate::error::DispatchError;

/// Id of the header badge showing the cart count.
pub const BADGE_ID: &str = "cart-badge";

/// Number of items in the user's cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CartCount(u32);

impl CartCount {
    pub fn new(count: u32) -> Self {
        Self(count)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for CartCount {
    fn from(count: u32) -> Self {
        Self(count)
    }
}

impl fmt::Display for CartCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Page-lifetime view state for the cart badge.
///
/// The count is only ever overwritten with a value the server reported;
/// it is unset until the first successful report.
#[derive(Debug, Default)]
pub struct CartSession {
    count: Cell<Option<CartCount>>,
}

impl CartSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> Option<CartCount> {
        self.count.get()
    }

    pub fn apply(&self, count: CartCount) {
        self.count.set(Some(count));
    }

    /// Ask the server for the current count and store it.
    pub async fn refresh(&self, dispatcher: &Dispatcher) -> Result<CartCount, DispatchError> {
        let reply = dispatcher.dispatch(Command::RefreshCartCount).await?;
        let count = reply.cart_count.unwrap_or_default();
        self.apply(count);
        Ok(count)
    }

    /// Show the count on the badge, hidden at zero. Does nothing while the
    /// count is unset or the page has no badge.
    pub fn render<D: Document>(&self, doc: &D) {
        let (Some(count), Some(badge)) = (self.count(), doc.by_id(BADGE_ID)) else {
            return;
        };
        doc.set_text(&badge, &count.to_string());
        let display = if count.is_empty() { "none" } else { "block" };
        doc.set_style(&badge, "display", display);
    }
}
