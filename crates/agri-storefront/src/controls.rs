//! Busy and confirmation states of buttons.

use crate::dom::Document;
use crate::messages::{ADDED_HTML, SPINNER_ICON};

const OUTLINE_CLASS: &str = "btn-outline-success";
const SOLID_CLASS: &str = "btn-success";

/// A control's label, captured before it is switched to a busy state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSnapshot {
    html: String,
}

impl ControlSnapshot {
    /// Remember `control`'s label, then disable it and show a spinner
    /// with `label`.
    pub fn busy<D: Document>(doc: &D, control: &D::Node, label: &str) -> Self {
        let snapshot = Self {
            html: doc.inner_html(control),
        };
        doc.set_disabled(control, true);
        doc.set_inner_html(control, &format!("{SPINNER_ICON}{label}"));
        snapshot
    }

    /// Put the original label back and re-enable the control.
    pub fn restore<D: Document>(&self, doc: &D, control: &D::Node) {
        doc.set_inner_html(control, &self.html);
        doc.set_disabled(control, false);
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

/// Show the "Added!" state on an add-to-cart button. The button stays
/// disabled until [`clear_added`] runs.
pub fn show_added<D: Document>(doc: &D, control: &D::Node) {
    doc.set_inner_html(control, ADDED_HTML);
    doc.remove_class(control, OUTLINE_CLASS);
    doc.add_class(control, SOLID_CLASS);
}

/// Leave the "Added!" state for the label in `snapshot`.
pub fn clear_added<D: Document>(doc: &D, control: &D::Node, snapshot: &ControlSnapshot) {
    snapshot.restore(doc, control);
    doc.remove_class(control, SOLID_CLASS);
    doc.add_class(control, OUTLINE_CLASS);
}
