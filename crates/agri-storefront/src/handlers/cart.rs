//! Add to cart, quantity update and removal.

use std::rc::Rc;

use agri_commerce::format::parse_int_prefix;
use agri_commerce::{CartItemId, ProductId};

use crate::command::{Command, Reply};
use crate::controls::{self, ControlSnapshot};
use crate::dom::{css_string, Document, Host};
use crate::messages;
use crate::notify::Severity;
use crate::storefront::Storefront;

impl<D: Document, H: Host> Storefront<D, H> {
    pub(crate) fn on_add_to_cart(self: &Rc<Self>, button: &D::Node) {
        let doc = &*self.doc;
        let Some(product_id) = ProductId::parse(doc.data(button, "product-id").as_deref()) else {
            self.missing_data(button, "product-id", messages::ADD_TO_CART_FAILED);
            return;
        };
        let quantity = doc
            .data(button, "quantity")
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| "1".to_string());

        let snapshot = ControlSnapshot::busy(doc, button, messages::ADDING);
        let command = Command::AddToCart {
            product_id,
            quantity,
            csrf: self.csrf_token(),
        };

        let this = Rc::clone(self);
        let button = button.clone();
        self.spawn(async move {
            match this.dispatcher.dispatch(command).await {
                Ok(reply) => this.finish_add(&button, snapshot, &reply),
                Err(error) => {
                    this.report(&error, messages::ADD_TO_CART_FAILED);
                    snapshot.restore(&*this.doc, &button);
                }
            }
        });
    }

    fn finish_add(&self, button: &D::Node, snapshot: ControlSnapshot, reply: &Reply) {
        if let Some(message) = reply.message() {
            self.notify(Severity::Success, message);
        }
        if let Some(count) = reply.cart_count {
            self.session.apply(count);
            self.session.render(&*self.doc);
        }

        controls::show_added(&*self.doc, button);
        let doc = Rc::clone(&self.doc);
        let button = button.clone();
        self.after(self.config.timing.added_flash(), move || {
            controls::clear_added(&*doc, &button, &snapshot);
        });
    }

    pub(crate) fn on_update_quantity(self: &Rc<Self>, button: &D::Node) {
        let doc = &*self.doc;
        let Some(item_id) = CartItemId::parse(doc.data(button, "item-id").as_deref()) else {
            self.missing_data(button, "item-id", messages::CART_UPDATE_FAILED);
            return;
        };

        let selector = format!("input[data-item-id={}]", css_string(item_id.as_str()));
        let quantity = doc
            .query(&selector)
            .and_then(|input| parse_int_prefix(&doc.value(&input)));
        let Some(quantity) = quantity else {
            self.notify(Severity::Error, messages::INVALID_QUANTITY);
            return;
        };

        if quantity <= 0 {
            if self.host.confirm(messages::CONFIRM_REMOVE) {
                self.submit_quantity(item_id, 0);
            }
            return;
        }
        self.submit_quantity(item_id, quantity);
    }

    pub(crate) fn on_remove_item(self: &Rc<Self>, button: &D::Node) {
        let Some(item_id) = CartItemId::parse(self.doc.data(button, "item-id").as_deref()) else {
            self.missing_data(button, "item-id", messages::CART_UPDATE_FAILED);
            return;
        };
        if self.host.confirm(messages::CONFIRM_REMOVE) {
            self.submit_quantity(item_id, 0);
        }
    }

    /// Quantity 0 removes the line.
    fn submit_quantity(self: &Rc<Self>, item_id: CartItemId, quantity: i64) {
        let command = Command::UpdateQuantity {
            item_id,
            quantity,
            csrf: self.csrf_token(),
        };
        let this = Rc::clone(self);
        self.spawn(async move {
            match this.dispatcher.dispatch(command).await {
                Ok(_) => {
                    this.notify(Severity::Success, messages::CART_UPDATED);
                    // Line and cart totals are rendered by the server.
                    this.host.reload();
                }
                Err(error) => this.report(&error, messages::CART_UPDATE_FAILED),
            }
        });
    }
}
