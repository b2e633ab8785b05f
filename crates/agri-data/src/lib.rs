//! HTTP client utilities for the AgriConnect storefront.
//!
//! Provides a small builder API over a pluggable [`Transport`]: the browser's
//! `fetch` on wasm32, or a scripted [`MockTransport`] in tests.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use agri_data::{FetchClient, FormBody, Method, MockTransport};
//! use serde_json::json;
//!
//! let mock = Rc::new(MockTransport::new());
//! mock.on_json(Method::Post, "/add_to_cart", json!({"success": true, "cart_count": 3}));
//!
//! let client = FetchClient::new(mock.clone());
//! let mut form = FormBody::new();
//! form.append("product_id", "p1").append("quantity", "1");
//!
//! let response = futures::executor::block_on(client.post("/add_to_cart").form(&form).send())?;
//! let body: serde_json::Value = response.json()?;
//! assert_eq!(body["cart_count"], 3);
//! # Ok::<(), agri_data::FetchError>(())
//! ```

mod error;
mod form;
mod mock;
mod request;
mod response;
mod transport;

#[cfg(target_arch = "wasm32")]
mod browser;

use std::collections::HashMap;
use std::rc::Rc;

pub use error::FetchError;
pub use form::{encode_path_segment, FormBody};
pub use mock::{MockTransport, PendingReply};
pub use request::{Method, Request, RequestBuilder};
pub use response::Response;
pub use transport::Transport;

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserTransport;

/// HTTP client for the storefront endpoints.
#[derive(Clone)]
pub struct FetchClient {
    base_url: Option<String>,
    default_headers: HashMap<String, String>,
    transport: Rc<dyn Transport>,
}

impl FetchClient {
    /// Create a client over `transport`.
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        Self {
            base_url: None,
            default_headers: HashMap::new(),
            transport,
        }
    }

    /// A client over the page's `fetch`.
    #[cfg(target_arch = "wasm32")]
    pub fn browser() -> Self {
        Self::new(Rc::new(BrowserTransport::new()))
    }

    /// Create a client with a base URL that will be prepended to all requests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Create a GET request.
    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Get, url)
    }

    /// Create a POST request.
    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Post, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> ClientRequestBuilder {
        let url = url.into();
        let full_url = match &self.base_url {
            Some(base) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                format!("{}{}", base.trim_end_matches('/'), url)
            }
            _ => url,
        };

        let mut builder = RequestBuilder::new(method, full_url);
        for (key, value) in &self.default_headers {
            builder = builder.header(key.clone(), value.clone());
        }

        ClientRequestBuilder {
            builder,
            transport: self.transport.clone(),
        }
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder {
    builder: RequestBuilder,
    transport: Rc<dyn Transport>,
}

impl ClientRequestBuilder {
    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, FetchError> {
        self.builder = self.builder.json(value)?;
        Ok(self)
    }

    /// Set the request body as a URL-encoded form.
    pub fn form(mut self, form: &FormBody) -> Self {
        self.builder = self.builder.form(form);
        self
    }

    /// Set the Accept header.
    pub fn accept(mut self, content_type: impl Into<String>) -> Self {
        self.builder = self.builder.accept(content_type);
        self
    }

    /// Send the request and return the response.
    pub async fn send(self) -> Result<Response, FetchError> {
        self.transport.send(self.builder.build()).await
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FetchClient, FetchError, FormBody, Method, Response, Transport};
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;

    fn client_with(mock: &Rc<MockTransport>) -> FetchClient {
        FetchClient::new(mock.clone())
    }

    #[test]
    fn test_default_headers_applied() {
        let mock = Rc::new(MockTransport::new());
        mock.on_json(Method::Get, "/api/cart_count", json!({"count": 0}));

        let client = client_with(&mock).with_default_header("X-Requested-With", "XMLHttpRequest");
        block_on(client.get("/api/cart_count").send()).unwrap();

        let sent = &mock.requests()[0];
        assert_eq!(sent.header("x-requested-with"), Some("XMLHttpRequest"));
    }

    #[test]
    fn test_base_url_joined() {
        let mock = Rc::new(MockTransport::new());
        mock.on_json(Method::Get, "/api/cart_count", json!({"count": 0}));

        let client = client_with(&mock).with_base_url("https://shop.example/");
        block_on(client.get("/api/cart_count").send()).unwrap();

        assert_eq!(mock.requests()[0].url, "https://shop.example/api/cart_count");
    }

    #[test]
    fn test_absolute_url_bypasses_base() {
        let mock = Rc::new(MockTransport::new());
        let client = client_with(&mock).with_base_url("https://shop.example");
        let _ = block_on(client.get("https://other.example/x").send());
        assert_eq!(mock.requests()[0].url, "https://other.example/x");
    }

    #[test]
    fn test_json_post() {
        let mock = Rc::new(MockTransport::new());
        mock.on_json(Method::Post, "/update_cart_item", json!({"success": true}));

        let client = client_with(&mock);
        let resp = block_on(
            client
                .post("/update_cart_item")
                .header("X-CSRFToken", "tok")
                .json(&json!({"item_id": "a1", "quantity": 2}))
                .unwrap()
                .send(),
        )
        .unwrap();
        assert!(resp.is_success());

        let sent = &mock.requests_to("/update_cart_item")[0];
        assert_eq!(sent.header("X-CSRFToken"), Some("tok"));
        assert_eq!(sent.json().unwrap()["quantity"], 2);
    }
}
