//! Buyer offers and seller responses.

use std::rc::Rc;

use agri_commerce::OfferId;

use crate::command::{Command, OfferAction};
use crate::controls::ControlSnapshot;
use crate::csrf::CSRF_FIELD;
use crate::dom::{Document, Host};
use crate::messages;
use crate::notify::Severity;
use crate::storefront::Storefront;

impl<D: Document, H: Host> Storefront<D, H> {
    pub(crate) fn on_offer_submit(self: &Rc<Self>, form: &D::Node) {
        let doc = &*self.doc;
        let mut fields = doc.form_data(form);
        if !fields.has_value(CSRF_FIELD) {
            fields.set(CSRF_FIELD, self.csrf_token().as_str());
        }

        let submit = doc.query_in(form, "button[type=\"submit\"]");
        let snapshot = submit
            .as_ref()
            .map(|button| ControlSnapshot::busy(doc, button, messages::SENDING));

        let this = Rc::clone(self);
        let form = form.clone();
        self.spawn(async move {
            let result = this
                .dispatcher
                .dispatch(Command::SubmitOffer { form: fields })
                .await;
            match result {
                Ok(reply) => {
                    if let Some(message) = reply.message() {
                        this.notify(Severity::Success, message);
                    }
                    this.doc.reset_form(&form);
                    if let Some(modal) = this.doc.closest(&form, ".modal") {
                        this.doc.hide_modal(&modal);
                    }
                }
                Err(error) => this.report(&error, messages::OFFER_FAILED),
            }
            if let (Some(button), Some(snapshot)) = (submit, snapshot) {
                snapshot.restore(&*this.doc, &button);
            }
        });
    }

    pub(crate) fn on_respond_to_offer(self: &Rc<Self>, button: &D::Node) {
        let doc = &*self.doc;
        let Some(offer_id) = OfferId::parse(doc.data(button, "offer-id").as_deref()) else {
            self.missing_data(button, "offer-id", messages::RESPOND_FAILED);
            return;
        };
        let raw_action = doc.data(button, "action").unwrap_or_default();
        let Some(action) = OfferAction::parse(&raw_action) else {
            self.logger
                .warn_builder("Unknown offer action")
                .field("action", raw_action)
                .field("offer_id", offer_id.as_str())
                .emit();
            self.notify(Severity::Error, messages::RESPOND_FAILED);
            return;
        };

        let this = Rc::clone(self);
        self.spawn(async move {
            let command = Command::RespondToOffer { offer_id, action };
            match this.dispatcher.dispatch(command).await {
                Ok(reply) => {
                    if let Some(message) = reply.message() {
                        this.notify(Severity::Success, message);
                    }
                    this.host.reload();
                }
                Err(error) => this.report(&error, messages::RESPOND_FAILED),
            }
        });
    }
}
