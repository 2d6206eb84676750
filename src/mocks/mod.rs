//! In-memory test doubles for the transport and token layers.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::auth::{AccessToken, TokenProvider};
use crate::errors::{DhlError, DhlResult};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A mock response to return.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Bytes,
}

impl MockResponse {
    /// Creates a 200 response with a JSON body.
    pub fn json(body: serde_json::Value) -> Self {
        Self::json_with_status(200, body)
    }

    /// Creates a JSON response with the given status.
    pub fn json_with_status(status: u16, body: serde_json::Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self {
            status,
            headers,
            body: Bytes::from(body.to_string()),
        }
    }

    /// Creates an error response in the shape the gateway uses.
    pub fn error(status: u16, message: &str) -> Self {
        Self::json_with_status(status, serde_json::json!({ "key": "error", "message": message }))
    }

    /// Creates a response with an arbitrary body.
    pub fn raw(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Adds a response header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_lowercase(), value.to_string());
        self
    }

    /// Creates a response with an empty body.
    pub fn empty(status: u16) -> Self {
        Self::raw(status, Bytes::new())
    }
}

/// Mock transport that replays queued responses and records requests.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<DhlResult<MockResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
    default_response: Option<MockResponse>,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a response to the queue.
    pub fn enqueue_response(&self, response: MockResponse) {
        lock(&self.responses).push_back(Ok(response));
    }

    /// Adds a transport failure to the queue.
    pub fn enqueue_error(&self, error: DhlError) {
        lock(&self.responses).push_back(Err(error));
    }

    /// Sets a default response for when the queue is empty.
    pub fn set_default_response(mut self, response: MockResponse) -> Self {
        self.default_response = Some(response);
        self
    }

    /// Gets all recorded requests.
    pub fn get_requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Gets the last recorded request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Returns the number of requests made.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    fn next_response(&self) -> DhlResult<MockResponse> {
        lock(&self.responses)
            .pop_front()
            .or_else(|| self.default_response.clone().map(Ok))
            .unwrap_or_else(|| Ok(MockResponse::error(500, "No mock response configured")))
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> DhlResult<HttpResponse> {
        lock(&self.requests).push(request);

        let response = self.next_response()?;
        Ok(HttpResponse {
            status: response.status,
            headers: response.headers,
            body: response.body,
        })
    }
}

/// Token provider that hands out `token-1`, `token-2`, ... on demand.
#[derive(Default)]
pub struct MockTokenProvider {
    current: Mutex<Option<AccessToken>>,
    issued: AtomicUsize,
    refreshes: AtomicUsize,
    failure: Mutex<Option<DhlError>>,
}

impl MockTokenProvider {
    /// Creates a new mock token provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next token request fail with `error`.
    pub fn fail_next(&self, error: DhlError) {
        *lock(&self.failure) = Some(error);
    }

    /// Returns how many tokens were issued.
    pub fn issued_count(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }

    /// Returns how many forced refreshes were requested.
    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    fn issue(&self) -> DhlResult<AccessToken> {
        if let Some(error) = lock(&self.failure).take() {
            return Err(error);
        }

        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let token = AccessToken::new(format!("token-{}", n), Utc::now() + Duration::minutes(15));
        *lock(&self.current) = Some(token.clone());
        Ok(token)
    }
}

#[async_trait]
impl TokenProvider for MockTokenProvider {
    async fn get_token(&self) -> DhlResult<Option<AccessToken>> {
        let current = lock(&self.current).clone();
        match current {
            Some(token) => Ok(Some(token)),
            None => self.issue().map(Some),
        }
    }

    async fn refresh(&self, _rejected: &AccessToken) -> DhlResult<Option<AccessToken>> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        self.issue().map(Some)
    }
}
