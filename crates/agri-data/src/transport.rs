//! The seam between the client and whatever actually moves bytes.

use async_trait::async_trait;

use crate::{FetchError, Request, Response};

/// Sends a built request and resolves with the server's response.
///
/// Futures are not `Send`: the browser event loop is single-threaded and
/// the wasm transport holds `JsValue`s across await points.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: Request) -> Result<Response, FetchError>;
}
