//! `window.fetch` transport.

use std::collections::HashMap;

use async_trait::async_trait;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{RequestCredentials, RequestInit};

use crate::{FetchError, Request, Response, Transport};

/// Sends requests through the page's `fetch`, with same-origin cookies so
/// the server session and CSRF token line up.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserTransport;

impl BrowserTransport {
    pub fn new() -> Self {
        Self
    }
}

fn js_error(err: JsValue) -> FetchError {
    let message = err
        .as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{err:?}"));
    FetchError::RequestError(message)
}

#[async_trait(?Send)]
impl Transport for BrowserTransport {
    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        let window = web_sys::window()
            .ok_or_else(|| FetchError::RequestError("no window".to_string()))?;

        let init = RequestInit::new();
        init.set_method(request.method.as_str());
        init.set_credentials(RequestCredentials::SameOrigin);
        if let Some(body) = &request.body {
            let bytes = js_sys::Uint8Array::from(body.as_slice());
            init.set_body(&bytes);
        }

        let js_request =
            web_sys::Request::new_with_str_and_init(&request.url, &init).map_err(js_error)?;
        for (key, value) in &request.headers {
            js_request.headers().set(key, value).map_err(js_error)?;
        }

        let value = JsFuture::from(window.fetch_with_request(&js_request))
            .await
            .map_err(js_error)?;
        let js_response: web_sys::Response = value.dyn_into().map_err(js_error)?;

        let mut headers = HashMap::new();
        if let Ok(Some(entries)) = js_sys::try_iter(&js_response.headers()) {
            for entry in entries.flatten() {
                let pair: js_sys::Array = entry.unchecked_into();
                if let (Some(k), Some(v)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
                    headers.insert(k, v);
                }
            }
        }

        let buffer = JsFuture::from(js_response.array_buffer().map_err(js_error)?)
            .await
            .map_err(|e| FetchError::ParseError(format!("{e:?}")))?;
        let body = js_sys::Uint8Array::new(&buffer).to_vec();

        Ok(Response::new(js_response.status(), headers, body))
    }
}
