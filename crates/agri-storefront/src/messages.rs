//! User-facing text and fixed markup.

// Fallback error notifications, shown when the server sends no message.
pub const ADD_TO_CART_FAILED: &str = "Error adding item to cart";
pub const CART_UPDATE_FAILED: &str = "Error updating cart";
pub const SELECTION_FAILED: &str = "Error updating selection";
pub const OFFER_FAILED: &str = "Error sending offer";
pub const RESPOND_FAILED: &str = "Error responding to offer";
pub const DELETE_FAILED: &str = "Error deleting product";

pub const CART_UPDATED: &str = "Cart updated successfully";
pub const INVALID_QUANTITY: &str = "Please enter a valid quantity";

// Confirm dialogs.
pub const CONFIRM_REMOVE: &str = "Are you sure you want to remove this item from your cart?";
pub const CONFIRM_DELETE: &str = "Are you sure you want to delete this product?";

// Busy labels.
pub const ADDING: &str = "Adding...";
pub const SENDING: &str = "Sending...";

pub const SPINNER_ICON: &str = r#"<i class="fas fa-spinner fa-spin me-1"></i>"#;
pub const ADDED_HTML: &str = r#"<i class="fas fa-check me-1"></i>Added!"#;
pub const SELECTED_ICON: &str = r#"<i class="fas fa-check-circle text-primary"></i>"#;
pub const UNSELECTED_ICON: &str = r#"<i class="far fa-circle"></i>"#;

/// Shown by the exported date formatter for unparseable input.
pub const INVALID_DATE: &str = "Invalid Date";
