//! HTTP request builder.

use crate::form::FormBody;
use crate::FetchError;
use serde::Serialize;
use std::collections::HashMap;

/// HTTP methods used by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// Convert to HTTP method string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A fully built request, handed to a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// The URL without scheme and host (`"https://shop/a?b"` -> `"/a?b"`).
    pub fn path(&self) -> &str {
        let rest = match self.url.split_once("://") {
            Some((_, rest)) => rest,
            None => return &self.url,
        };
        match rest.find('/') {
            Some(idx) => &rest[idx..],
            None => "/",
        }
    }

    /// Get a header value (case-insensitive).
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// The body as UTF-8 text, if any.
    pub fn body_text(&self) -> Option<&str> {
        self.body
            .as_deref()
            .and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Decode a form-encoded body.
    pub fn form(&self) -> Option<FormBody> {
        self.body_text().map(FormBody::decode)
    }

    /// Decode a JSON body.
    pub fn json(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }
}

/// A builder for constructing HTTP requests.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) body: Option<Vec<u8>>,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self, FetchError> {
        let json = serde_json::to_vec(value)?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.body = Some(json);
        Ok(self)
    }

    /// Set the request body as `application/x-www-form-urlencoded`.
    pub fn form(mut self, form: &FormBody) -> Self {
        self.headers.insert(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        self.body = Some(form.encode().into_bytes());
        self
    }

    /// Set the Accept header.
    pub fn accept(self, content_type: impl Into<String>) -> Self {
        self.header("Accept", content_type)
    }

    /// Finish building.
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_body_sets_content_type() {
        #[derive(Serialize)]
        struct Toggle<'a> {
            item_id: &'a str,
        }

        let request = RequestBuilder::new(Method::Post, "/toggle_cart_item_selection")
            .json(&Toggle { item_id: "row-1" })
            .unwrap()
            .build();

        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.json().unwrap()["item_id"], "row-1");
    }

    #[test]
    fn test_form_body_round_trips_through_request() {
        let mut form = FormBody::new();
        form.append("product_id", "p 1");
        form.append("quantity", "2");

        let request = RequestBuilder::new(Method::Post, "/add_to_cart")
            .form(&form)
            .build();

        assert_eq!(
            request.header("Content-Type"),
            Some("application/x-www-form-urlencoded")
        );
        let decoded = request.form().unwrap();
        assert_eq!(decoded.get("product_id"), Some("p 1"));
        assert_eq!(decoded.get("quantity"), Some("2"));
    }

    #[test]
    fn test_request_path() {
        let request = RequestBuilder::new(Method::Get, "https://shop.example/api/cart_count").build();
        assert_eq!(request.path(), "/api/cart_count");

        let request = RequestBuilder::new(Method::Get, "/api/cart_count").build();
        assert_eq!(request.path(), "/api/cart_count");

        let request = RequestBuilder::new(Method::Get, "http://shop.example").build();
        assert_eq!(request.path(), "/");
    }
}
