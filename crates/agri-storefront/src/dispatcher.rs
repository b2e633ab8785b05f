//! Command dispatch.
//!
//! Turns a [`Command`] into one HTTP request and classifies the outcome:
//! transport trouble and unreadable bodies are [`DispatchError::Network`],
//! a readable body with `success: false` is [`DispatchError::Application`].
//! Nothing is retried.

use agri_data::{FetchClient, FetchError, FormBody, Response};
use agri_observability::StructuredLogger;
use serde::de::DeserializeOwned;

use crate::api::{ApiReply, CartCountReply, ToggleSelectionBody, UpdateCartItemBody};
use crate::command::{Command, Reply};
use crate::config::EndpointConfig;
use crate::csrf::{CsrfToken, CSRF_FIELD, CSRF_HEADER};
use crate::error::DispatchError;
use crate::session::CartCount;

const JSON: &str = "application/json";

/// Sends commands to the backend.
#[derive(Clone)]
pub struct Dispatcher {
    client: FetchClient,
    endpoints: EndpointConfig,
    logger: StructuredLogger,
}

impl Dispatcher {
    pub fn new(client: FetchClient, endpoints: EndpointConfig, logger: StructuredLogger) -> Self {
        Self {
            client,
            endpoints,
            logger,
        }
    }

    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    /// Send `command` and wait for the server's verdict.
    pub async fn dispatch(&self, command: Command) -> Result<Reply, DispatchError> {
        let name = command.name();
        let path = command.path(&self.endpoints);
        self.logger
            .debug_builder("Dispatching command")
            .field("command", name)
            .field("endpoint", path.as_str())
            .emit();

        let result = self.send(command, &path).await;

        match &result {
            Ok(_) => {}
            Err(DispatchError::Network(error)) => {
                let mut entry = self
                    .logger
                    .error_builder("Request failed")
                    .field("command", name)
                    .field("endpoint", path.as_str())
                    .display("error", error);
                if let Some(status) = error.status() {
                    entry = entry.field_i64("status", i64::from(status));
                }
                entry.emit();
            }
            Err(DispatchError::Application { message }) => self
                .logger
                .warn_builder("Request rejected")
                .field("command", name)
                .field("endpoint", path.as_str())
                .field("message", message.as_deref().unwrap_or(""))
                .emit(),
        }
        result
    }

    async fn send(&self, command: Command, path: &str) -> Result<Reply, DispatchError> {
        match command {
            Command::AddToCart {
                product_id,
                quantity,
                csrf,
            } => {
                let mut form = FormBody::new();
                form.append("product_id", product_id.as_str())
                    .append("quantity", quantity)
                    .append(CSRF_FIELD, csrf.as_str());
                self.post_form(path, &form, None).await
            }
            Command::UpdateQuantity {
                item_id,
                quantity,
                csrf,
            } => {
                let body = UpdateCartItemBody {
                    item_id: item_id.as_str(),
                    quantity,
                };
                self.post_json(path, &body, &csrf).await
            }
            Command::ToggleSelection { item_id, csrf } => {
                let body = ToggleSelectionBody {
                    item_id: item_id.as_str(),
                };
                let mut reply = self.post_json(path, &body, &csrf).await?;
                // The new state is whatever the server declares; silence means off.
                reply.selected = Some(reply.selected.unwrap_or(false));
                Ok(reply)
            }
            Command::SubmitOffer { form } => self.post_form(path, &form, None).await,
            Command::RefreshCartCount => {
                let response = self.client.get(path).accept(JSON).send().await?;
                let body: CartCountReply = decode(&response)?;
                Ok(Reply {
                    cart_count: Some(CartCount::new(body.count)),
                    ..Reply::default()
                })
            }
            Command::RespondToOffer { .. } => {
                let response = self.client.get(path).accept(JSON).send().await?;
                verdict(decode(&response)?)
            }
            Command::DeleteProduct { csrf, .. } => {
                let mut form = FormBody::new();
                form.append(CSRF_FIELD, csrf.as_str());
                self.post_form(path, &form, Some(&csrf)).await
            }
        }
    }

    async fn post_form(
        &self,
        path: &str,
        form: &FormBody,
        csrf_header: Option<&CsrfToken>,
    ) -> Result<Reply, DispatchError> {
        let mut request = self.client.post(path).accept(JSON).form(form);
        if let Some(csrf) = csrf_header {
            request = request.header(CSRF_HEADER, csrf.as_str());
        }
        let response = request.send().await?;
        verdict(decode(&response)?)
    }

    async fn post_json<T: serde::Serialize>(
        &self,
        path: &str,
        body: &T,
        csrf: &CsrfToken,
    ) -> Result<Reply, DispatchError> {
        let response = self
            .client
            .post(path)
            .accept(JSON)
            .header(CSRF_HEADER, csrf.as_str())
            .json(body)?
            .send()
            .await?;
        verdict(decode(&response)?)
    }
}

/// Read a JSON body whatever the status. An unreadable body on an error
/// status is reported as that status.
fn decode<T: DeserializeOwned>(response: &Response) -> Result<T, FetchError> {
    match response.json() {
        Ok(body) => Ok(body),
        Err(_) if !response.is_success() => Err(response.status_error()),
        Err(e) => Err(e),
    }
}

fn verdict(reply: ApiReply) -> Result<Reply, DispatchError> {
    if !reply.success {
        return Err(DispatchError::Application {
            message: reply.message,
        });
    }
    Ok(Reply {
        message: reply.message,
        cart_count: reply.cart_count.map(CartCount::new),
        selected: reply.selected,
    })
}
