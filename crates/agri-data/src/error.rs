//! Fetch failures.

use thiserror::Error;

/// Why a request produced no usable response.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The request never completed (offline, CORS, aborted).
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Non-2xx status with a body that could not be read as a reply.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// The body was not the expected JSON shape.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// A request body could not be serialized.
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl FetchError {
    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::JsonError(e.to_string())
    }
}
