//! Cart row selection and the selected subtotal.

use std::rc::Rc;

use agri_commerce::cart::{RowTotal, SelectionSummary};
use agri_commerce::{CartItemId, Currency};

use crate::command::Command;
use crate::dom::{Document, Host};
use crate::messages;
use crate::storefront::Storefront;

const SELECTED_CLASS: &str = "selected";
const HIGHLIGHT_CLASS: &str = "selection-highlight";

impl<D: Document, H: Host> Storefront<D, H> {
    pub(crate) fn on_toggle_selection(self: &Rc<Self>, control: &D::Node) {
        let Some(item_id) = CartItemId::parse(self.doc.data(control, "item-id").as_deref())
        else {
            self.missing_data(control, "item-id", messages::SELECTION_FAILED);
            return;
        };
        let command = Command::ToggleSelection {
            item_id,
            csrf: self.csrf_token(),
        };

        let this = Rc::clone(self);
        let control = control.clone();
        self.spawn(async move {
            match this.dispatcher.dispatch(command).await {
                Ok(reply) => this.show_selection(&control, reply.selected.unwrap_or(false)),
                Err(error) => this.report(&error, messages::SELECTION_FAILED),
            }
        });
    }

    /// Mirror the server's selection state onto the control and its row.
    fn show_selection(&self, control: &D::Node, selected: bool) {
        let doc = &*self.doc;
        doc.set_class(control, SELECTED_CLASS, selected);
        let icon = if selected {
            messages::SELECTED_ICON
        } else {
            messages::UNSELECTED_ICON
        };
        doc.set_inner_html(control, icon);

        if let Some(row) = doc.closest(control, ".cart-item-row") {
            doc.set_class(&row, SELECTED_CLASS, selected);
            if selected {
                doc.add_class(&row, HIGHLIGHT_CLASS);
                let doc = Rc::clone(&self.doc);
                self.after(self.config.timing.selection_highlight(), move || {
                    doc.remove_class(&row, HIGHLIGHT_CLASS);
                });
            }
        }

        self.update_selected_total();
    }

    /// Re-add the totals of the selected rows into `#selected-total` and
    /// enable the negotiate button only while something is selected.
    pub fn update_selected_total(&self) -> SelectionSummary {
        let doc = &*self.doc;
        let rows: Vec<RowTotal> = doc
            .query_all(".cart-item-row.selected")
            .iter()
            .map(|row| RowTotal {
                text: doc.query_in(row, ".item-total").map(|total| doc.text(&total)),
                selected: true,
            })
            .collect();
        let summary = SelectionSummary::from_rows(rows.iter(), Currency::INR);

        if summary.skipped_rows > 0 {
            self.logger
                .debug_builder("Skipped unreadable row totals")
                .field_i64("rows", summary.skipped_rows as i64)
                .emit();
        }

        if let Some(total) = doc.by_id("selected-total") {
            doc.set_text(&total, &summary.total.display());
        }
        if let Some(negotiate) = doc.by_id("negotiate-selected-btn") {
            doc.set_disabled(&negotiate, !summary.has_selection());
        }
        summary
    }
}
