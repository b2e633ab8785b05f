//! Observability for the AgriConnect storefront.
//!
//! This crate provides:
//! - `SessionId` - Identifier for one page load
//! - `StructuredLogger` - Structured logging with session context
//! - `LogSink` - Browser console, stderr, `tracing` or in-memory output

mod logging;
mod session;

pub use logging::*;
pub use session::{now_ms, SessionId};
