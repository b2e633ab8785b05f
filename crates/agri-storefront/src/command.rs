//! Typed backend commands.
//!
//! Each user gesture that reaches the server becomes one [`Command`]. The
//! [`Dispatcher`](crate::Dispatcher) turns it into a request and reads the
//! result back as a [`Reply`].

use std::fmt;

use agri_commerce::{CartItemId, OfferId, ProductId};
use agri_data::{encode_path_segment, FormBody};

use crate::config::EndpointConfig;
use crate::csrf::CsrfToken;
use crate::session::CartCount;

/// Seller decision on an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferAction {
    Accept,
    Reject,
}

impl OfferAction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "accept" => Some(Self::Accept),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for OfferAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddToCart {
        product_id: ProductId,
        /// Sent as written on the button.
        quantity: String,
        csrf: CsrfToken,
    },
    UpdateQuantity {
        item_id: CartItemId,
        quantity: i64,
        csrf: CsrfToken,
    },
    ToggleSelection {
        item_id: CartItemId,
        csrf: CsrfToken,
    },
    /// The offer form's fields, token included.
    SubmitOffer { form: FormBody },
    RefreshCartCount,
    RespondToOffer {
        offer_id: OfferId,
        action: OfferAction,
    },
    DeleteProduct {
        product_id: ProductId,
        csrf: CsrfToken,
    },
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddToCart { .. } => "add_to_cart",
            Self::UpdateQuantity { .. } => "update_quantity",
            Self::ToggleSelection { .. } => "toggle_selection",
            Self::SubmitOffer { .. } => "submit_offer",
            Self::RefreshCartCount => "refresh_cart_count",
            Self::RespondToOffer { .. } => "respond_to_offer",
            Self::DeleteProduct { .. } => "delete_product",
        }
    }

    /// Path this command is sent to.
    pub fn path(&self, endpoints: &EndpointConfig) -> String {
        match self {
            Self::AddToCart { .. } => endpoints.add_to_cart.clone(),
            Self::UpdateQuantity { .. } => endpoints.update_cart_item.clone(),
            Self::ToggleSelection { .. } => endpoints.toggle_selection.clone(),
            Self::SubmitOffer { .. } => endpoints.send_offer.clone(),
            Self::RefreshCartCount => endpoints.cart_count.clone(),
            Self::RespondToOffer { offer_id, action } => format!(
                "{}/{}/{}",
                endpoints.respond_to_offer.trim_end_matches('/'),
                encode_path_segment(offer_id.as_str()),
                action
            ),
            Self::DeleteProduct { product_id, .. } => format!(
                "{}/{}",
                endpoints.delete_product.trim_end_matches('/'),
                encode_path_segment(product_id.as_str())
            ),
        }
    }
}

/// What a successful command reported back.
///
/// Fields the endpoint does not send stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    pub message: Option<String>,
    pub cart_count: Option<CartCount>,
    pub selected: Option<bool>,
}

impl Reply {
    /// Non-empty server message.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }
}
