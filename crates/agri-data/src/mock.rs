//! Scripted in-memory transport for tests and native development.

use std::cell::RefCell;
use std::collections::VecDeque;

use async_trait::async_trait;
use futures::channel::oneshot;

use crate::{FetchError, Method, Request, Response, Transport};

type Outcome = Result<Response, FetchError>;

enum Scripted {
    Ready(Outcome),
    Deferred(oneshot::Receiver<Outcome>),
}

struct Route {
    method: Method,
    path: String,
    replies: VecDeque<Scripted>,
}

/// A transport that answers from a per-route script.
///
/// Replies queued for the same route are served in order; the last ready
/// reply is repeated for every later request. Deferred replies are served
/// once and resolve when the test completes the matching [`PendingReply`].
/// Requests with no route fail with [`FetchError::RequestError`].
#[derive(Default)]
pub struct MockTransport {
    routes: RefCell<Vec<Route>>,
    requests: RefCell<Vec<Request>>,
}

impl MockTransport {
    /// Create a transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `method path`.
    pub fn on(&self, method: Method, path: impl Into<String>, response: Response) -> &Self {
        self.push(method, path.into(), Scripted::Ready(Ok(response)));
        self
    }

    /// Queue a 200 JSON response for `method path`.
    pub fn on_json(
        &self,
        method: Method,
        path: impl Into<String>,
        body: serde_json::Value,
    ) -> &Self {
        self.on(method, path, Response::json_body(&body))
    }

    /// Queue a transport failure for `method path`.
    pub fn fail(&self, method: Method, path: impl Into<String>, message: &str) -> &Self {
        self.push(
            method,
            path.into(),
            Scripted::Ready(Err(FetchError::RequestError(message.to_string()))),
        );
        self
    }

    /// Queue a reply that stays pending until the returned handle completes it.
    pub fn defer(&self, method: Method, path: impl Into<String>) -> PendingReply {
        let (tx, rx) = oneshot::channel();
        self.push(method, path.into(), Scripted::Deferred(rx));
        PendingReply { tx }
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    /// Requests sent to `path`, in order.
    pub fn requests_to(&self, path: &str) -> Vec<Request> {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.path() == path)
            .cloned()
            .collect()
    }

    fn push(&self, method: Method, path: String, reply: Scripted) {
        let mut routes = self.routes.borrow_mut();
        match routes
            .iter_mut()
            .find(|r| r.method == method && r.path == path)
        {
            Some(route) => route.replies.push_back(reply),
            None => routes.push(Route {
                method,
                path,
                replies: VecDeque::from([reply]),
            }),
        }
    }

    fn next_reply(&self, request: &Request) -> Option<Scripted> {
        let mut routes = self.routes.borrow_mut();
        let route = routes
            .iter_mut()
            .find(|r| r.method == request.method && r.path == request.path())?;

        match route.replies.front() {
            Some(Scripted::Ready(outcome)) if route.replies.len() == 1 => {
                Some(Scripted::Ready(outcome.clone()))
            }
            _ => route.replies.pop_front(),
        }
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        let reply = self.next_reply(&request);
        let label = format!("{} {}", request.method.as_str(), request.path());
        self.requests.borrow_mut().push(request);

        match reply {
            Some(Scripted::Ready(outcome)) => outcome,
            Some(Scripted::Deferred(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(FetchError::RequestError(format!("{label} aborted")))),
            None => Err(FetchError::RequestError(format!("no route for {label}"))),
        }
    }
}

/// Completes a reply queued with [`MockTransport::defer`].
pub struct PendingReply {
    tx: oneshot::Sender<Outcome>,
}

impl PendingReply {
    /// Resolve with a 200 JSON body.
    pub fn respond_json(self, body: serde_json::Value) {
        let _ = self.tx.send(Ok(Response::json_body(&body)));
    }

    /// Resolve with an arbitrary response.
    pub fn respond(self, response: Response) {
        let _ = self.tx.send(Ok(response));
    }

    /// Reject as a transport failure.
    pub fn fail(self, message: &str) {
        let _ = self.tx.send(Err(FetchError::RequestError(message.to_string())));
    }
}
