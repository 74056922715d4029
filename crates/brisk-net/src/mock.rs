//! Canned-response transport
//!
//! Answers requests from a table keyed by URL and records every request it
//! sees. Hosts use it to drive a runtime without a network.

use crate::{BoxFuture, NetError, Request, Response, Transport};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
struct Inner {
    routes: HashMap<String, Result<Response, NetError>>,
    requests: Vec<Request>,
}

/// Transport answering from a route table; clones share the table and log
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests for `url` with a 200 response carrying `body`
    pub fn with_body(self, url: &str, body: &str) -> Self {
        self.with_response(url, Response::ok(body))
    }

    pub fn with_response(self, url: &str, response: Response) -> Self {
        self.route(url, Ok(response));
        self
    }

    /// Fail requests for `url` with `error`
    pub fn with_error(self, url: &str, error: NetError) -> Self {
        self.route(url, Err(error));
        self
    }

    /// Replace the answer for `url`
    pub fn route(&self, url: &str, answer: Result<Response, NetError>) {
        self.lock().routes.insert(url.to_string(), answer);
    }

    /// Requests seen so far, in submission order
    pub fn requests(&self) -> Vec<Request> {
        self.lock().requests.clone()
    }

    pub fn take_requests(&self) -> Vec<Request> {
        std::mem::take(&mut self.lock().requests)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn answer(&self, request: Request) -> Result<Response, NetError> {
        let mut inner = self.lock();
        let path = request.url.split('?').next().unwrap_or_default().to_string();
        let answer = inner
            .routes
            .get(&request.url)
            .or_else(|| inner.routes.get(&path))
            .cloned()
            .unwrap_or_else(|| Ok(Response::with_status(404, format!("no route for {}", request.url))));
        inner.requests.push(request);
        answer
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: Request) -> BoxFuture<Result<Response, NetError>> {
        let answer = self.answer(request);
        Box::pin(async move { answer })
    }
}
