//! Storefront error types.

use agri_commerce::CommerceError;
use agri_data::FetchError;
use thiserror::Error;

/// Setup and page-structure errors.
#[derive(Error, Debug)]
pub enum StorefrontError {
    /// TOML configuration could not be parsed.
    #[error("Invalid TOML config: {0}")]
    ConfigToml(#[from] toml::de::Error),

    /// JSON configuration could not be parsed.
    #[error("Invalid JSON config: {0}")]
    ConfigJson(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("Failed to read config file {path}: {message}")]
    ConfigRead { path: String, message: String },

    /// An element the operation needs is not on the page.
    #[error("Missing page element: {0}")]
    MissingElement(String),

    /// Page value could not be interpreted.
    #[error(transparent)]
    Commerce(#[from] CommerceError),
}

/// Why a backend command did not succeed.
///
/// Transport failures and malformed bodies are `Network`; a well-formed
/// reply with `success: false` is `Application`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("Network error: {0}")]
    Network(#[from] FetchError),

    #[error("Request rejected: {}", message.as_deref().unwrap_or("no message"))]
    Application { message: Option<String> },
}

impl DispatchError {
    /// Text shown to the user: the server's message when it sent one,
    /// otherwise `fallback`.
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            Self::Application {
                message: Some(message),
            } if !message.is_empty() => message,
            _ => fallback,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Result type for storefront setup.
pub type Result<T> = std::result::Result<T, StorefrontError>;
