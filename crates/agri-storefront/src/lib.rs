//! Browser interaction layer for the AgriConnect storefront.
//!
//! Binds the storefront page's controls (cart buttons, selection ticks,
//! the offer form, quantity steppers) to the backend endpoints and reflects
//! the results back into the page.
//!
//! All page access goes through the [`Document`] and [`Host`] traits:
//! [`WebDocument`]/[`WebHost`] drive the real page on wasm32, and
//! [`MemoryDocument`]/[`MemoryHost`] drive an in-memory page in tests.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use agri_data::{FetchClient, Method, MockTransport};
//! use agri_observability::StructuredLogger;
//! use agri_storefront::prelude::*;
//! use serde_json::json;
//!
//! let doc = Rc::new(MemoryDocument::parse(r#"<span id="cart-badge"></span>"#));
//! let host = Rc::new(MemoryHost::new());
//! let mock = Rc::new(MockTransport::new());
//! mock.on_json(Method::Get, "/api/cart_count", json!({"count": 3}));
//!
//! let (logger, _logs) = StructuredLogger::memory();
//! let storefront = Storefront::new(
//!     doc.clone(),
//!     host.clone(),
//!     FetchClient::new(mock),
//!     StorefrontConfig::default(),
//!     logger,
//! );
//! storefront.start();
//! host.run_until_stalled();
//!
//! let badge = doc.by_id("cart-badge").unwrap();
//! assert_eq!(doc.text(&badge), "3");
//! ```
//!
//! [`WebDocument`]: dom::WebDocument
//! [`WebHost`]: dom::WebHost

pub mod api;
pub mod command;
pub mod config;
pub mod controls;
pub mod csrf;
pub mod dispatcher;
pub mod dom;
pub mod error;
pub mod format;
mod handlers;
pub mod messages;
pub mod notify;
pub mod reveal;
pub mod session;
mod storefront;

pub use command::{Command, OfferAction, Reply};
pub use config::StorefrontConfig;
pub use csrf::CsrfToken;
pub use dispatcher::Dispatcher;
pub use dom::{Document, EventKind, Host, MemoryDocument, MemoryHost, NodeId};
pub use error::{DispatchError, StorefrontError};
pub use notify::{NotificationCenter, NotificationId, Severity};
pub use session::{CartCount, CartSession};
pub use storefront::Storefront;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::StorefrontConfig;
    pub use crate::dom::{Document, EventKind, Host, MemoryDocument, MemoryHost, NodeId};
    pub use crate::error::{DispatchError, StorefrontError};
    pub use crate::notify::Severity;
    pub use crate::session::CartCount;
    pub use crate::storefront::Storefront;
    pub use crate::{Command, CsrfToken, Dispatcher, Reply};
}
