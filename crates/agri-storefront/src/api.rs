//! Wire shapes of the storefront endpoints.

use serde::{Deserialize, Serialize};

/// Body shared by every mutating endpoint.
///
/// Missing fields are tolerated; a body without `success` counts as a
/// rejection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub cart_count: Option<u32>,
    #[serde(default)]
    pub selected: Option<bool>,
}

/// Body of `GET /api/cart_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CartCountReply {
    pub count: u32,
}

/// JSON body of a quantity update.
#[derive(Debug, Serialize)]
pub struct UpdateCartItemBody<'a> {
    pub item_id: &'a str,
    pub quantity: i64,
}

/// JSON body of a selection toggle.
#[derive(Debug, Serialize)]
pub struct ToggleSelectionBody<'a> {
    pub item_id: &'a str,
}
