//! Event handlers, one module per page area.
//!
//! Handlers read what they need off the page synchronously, then spawn the
//! backend round trip so the user can keep interacting. Each reports its
//! own failures; nothing propagates out of a handler.

mod cart;
mod catalog;
mod offer;
mod selection;
mod stepper;

use std::rc::Rc;

use crate::dom::{Document, EventKind, Host};
use crate::storefront::Storefront;

impl<D: Document, H: Host> Storefront<D, H> {
    /// Attach every handler to the elements present now. Elements added
    /// later are not bound. Returns the number of listeners attached.
    pub(crate) fn bind_handlers(self: &Rc<Self>) -> usize {
        use EventKind::{Change, Click, Submit};

        let mut bound = 0;
        bound += self.bind_each(".add-to-cart-btn", Click, Self::on_add_to_cart);
        bound += self.bind_each(".update-cart-btn", Click, Self::on_update_quantity);
        bound += self.bind_each(".remove-cart-btn", Click, Self::on_remove_item);
        bound += self.bind_each(".selection-checkbox", Click, Self::on_toggle_selection);
        bound += self.bind_each("#offerForm", Submit, Self::on_offer_submit);
        bound += self.bind_steppers();
        bound += self.bind_each(".search-filter", Change, Self::on_search_filter_change);
        bound += self.bind_each(".respond-offer-btn", Click, Self::on_respond_to_offer);
        bound += self.bind_each(".delete-product-btn", Click, Self::on_delete_product);
        bound
    }
}
