//! Quantity `-`/`+` buttons.

use std::rc::Rc;

use agri_commerce::cart::{QuantityStepper, Step};

use crate::dom::{Document, EventKind, Host};
use crate::storefront::Storefront;

impl<D: Document, H: Host> Storefront<D, H> {
    /// Wire each `.quantity-control` that has both buttons and a number
    /// field. Returns the number of buttons bound.
    pub(crate) fn bind_steppers(self: &Rc<Self>) -> usize {
        let doc = &*self.doc;
        let mut bound = 0;
        for control in doc.query_all(".quantity-control") {
            let (Some(minus), Some(plus), Some(input)) = (
                doc.query_in(&control, ".qty-minus"),
                doc.query_in(&control, ".qty-plus"),
                doc.query_in(&control, "input[type=\"number\"]"),
            ) else {
                continue;
            };

            let field = input.clone();
            self.bind(&minus, EventKind::Click, move |this| {
                this.step_quantity(&field, Step::Decrement)
            });
            self.bind(&plus, EventKind::Click, move |this| {
                this.step_quantity(&input, Step::Increment)
            });
            bound += 2;
        }
        bound
    }

    /// Apply one press and fire `change` as a typed edit would.
    fn step_quantity(&self, input: &D::Node, step: Step) {
        let doc = &*self.doc;
        let stepper = QuantityStepper::from_max_attr(
            doc.attr(input, "max").as_deref(),
            self.config.stepper.default_max,
        );
        if let Some(next) = stepper.apply(&doc.value(input), step) {
            doc.set_value(input, &next.to_string());
            doc.dispatch(input, EventKind::Change);
        }
    }
}
