//! Product listing: search filters and seller deletion.

use std::rc::Rc;

use agri_commerce::ProductId;

use crate::command::Command;
use crate::dom::{Document, Host};
use crate::messages;
use crate::notify::Severity;
use crate::storefront::Storefront;

impl<D: Document, H: Host> Storefront<D, H> {
    pub(crate) fn on_search_filter_change(self: &Rc<Self>, filter: &D::Node) {
        if let Some(form) = self.doc.closest(filter, "form") {
            self.doc.submit_form(&form);
        }
    }

    pub(crate) fn on_delete_product(self: &Rc<Self>, button: &D::Node) {
        let Some(product_id) = ProductId::parse(self.doc.data(button, "product-id").as_deref())
        else {
            self.missing_data(button, "product-id", messages::DELETE_FAILED);
            return;
        };
        if !self.host.confirm(messages::CONFIRM_DELETE) {
            return;
        }

        let command = Command::DeleteProduct {
            product_id,
            csrf: self.csrf_token(),
        };
        let this = Rc::clone(self);
        self.spawn(async move {
            match this.dispatcher.dispatch(command).await {
                Ok(reply) => {
                    if let Some(message) = reply.message() {
                        this.notify(Severity::Success, message);
                    }
                    this.host.reload();
                }
                Err(error) => this.report(&error, messages::DELETE_FAILED),
            }
        });
    }
}
