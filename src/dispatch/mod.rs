//! Request dispatch and response classification.
//!
//! [`RequestDispatcher::call`] sends an [`ApiRequest`] through the
//! (authenticated) transport and applies one rule to every answer: a status
//! in `[200, 300)` is decoded as JSON, anything else becomes
//! [`DhlError::Api`].

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

use crate::errors::{DhlError, DhlResult};
use crate::observability::{log_request, log_response};
use crate::transport::{HttpRequest, HttpTransport, Method};

/// A single API call, constructed per call and not retained.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Operation name used in errors and logs.
    pub operation: &'static str,
    /// What the operation does, phrased to follow "Could not".
    pub description: &'static str,
    /// HTTP method.
    pub method: Method,
    /// Path relative to the base URL, starting with `/`.
    pub path: String,
    /// Query parameters, sent in order.
    pub query: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<Value>,
    /// Per-call timeout.
    pub timeout: Duration,
}

impl ApiRequest {
    /// Creates a request without query or body.
    pub fn new(method: Method, path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            operation: "request",
            description: "complete the request",
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            timeout,
        }
    }

    /// Names the operation for errors and logs.
    pub fn operation(mut self, operation: &'static str, description: &'static str) -> Self {
        self.operation = operation;
        self.description = description;
        self
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets the JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Sends requests and maps responses to decoded JSON or typed errors.
pub struct RequestDispatcher {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
}

impl RequestDispatcher {
    /// Creates a dispatcher for `base_url` on top of `transport`.
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
        }
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Performs the request and decodes the JSON response.
    ///
    /// An empty 2xx body decodes to `Value::Null`.
    pub async fn call(&self, request: ApiRequest) -> DhlResult<Value> {
        let span = tracing::debug_span!(
            "dhl_request",
            request_id = %Uuid::new_v4(),
            operation = request.operation,
            method = %request.method,
            path = %request.path,
        );

        self.execute(request).instrument(span).await
    }

    /// Performs the request and decodes the response into `T`.
    pub async fn call_as<T: DeserializeOwned>(&self, request: ApiRequest) -> DhlResult<T> {
        let operation = request.operation;
        let value = self.call(request).await?;

        serde_json::from_value(value.clone()).map_err(|e| DhlError::Decode {
            operation,
            message: e.to_string(),
            body: value.to_string(),
        })
    }

    async fn execute(&self, request: ApiRequest) -> DhlResult<Value> {
        let ApiRequest {
            operation,
            description,
            method,
            path,
            query,
            body,
            timeout,
        } = request;

        let mut http = HttpRequest::new(method, format!("{}{}", self.base_url, path), timeout);
        http.query = query;
        http.headers
            .insert("Accept".to_string(), "application/json".to_string());

        if let Some(body) = body {
            let encoded = serde_json::to_vec(&body).map_err(|e| DhlError::Serialization {
                message: e.to_string(),
            })?;
            log_request(method.as_str(), &path, Some(&*String::from_utf8_lossy(&encoded)));
            http = http.with_json_body(Bytes::from(encoded));
        } else {
            log_request(method.as_str(), &path, None);
        }

        let started = Instant::now();
        let response = self.transport.send(http).await?;
        let body_text = String::from_utf8_lossy(&response.body);
        log_response(
            response.status,
            started.elapsed().as_millis() as u64,
            Some(&*body_text),
        );

        if !response.is_success() {
            return Err(DhlError::api(
                operation,
                description,
                response.status,
                &response.body,
            ));
        }

        decode_body(operation, response.content_type(), &response.body)
    }
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn decode_body(
    operation: &'static str,
    content_type: Option<&str>,
    body: &[u8],
) -> DhlResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    serde_json::from_slice(body).map_err(|e| DhlError::Decode {
        operation,
        message: match content_type {
            Some(content_type) => format!("{} (content-type {})", e, content_type),
            None => e.to_string(),
        },
        body: String::from_utf8_lossy(body).into_owned(),
    })
}
