//! Newtype IDs for type-safe identifiers.
//!
//! The server hands out opaque string ids (document ids) through `data-*`
//! attributes. Wrapping them keeps a cart item id from being posted where a
//! product id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Read an ID from an optional attribute value, rejecting blanks.
            pub fn parse(raw: Option<&str>) -> Option<Self> {
                let raw = raw?.trim();
                if raw.is_empty() {
                    None
                } else {
                    Some(Self(raw.to_string()))
                }
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId, "Identifier of a listed product.");
define_id!(CartItemId, "Identifier of one line in the shopper's cart.");
define_id!(OfferId, "Identifier of a negotiated price offer.");
