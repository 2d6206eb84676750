//! Integration tests using WireMock
//!
//! These tests drive the client against a mock HTTP server and verify the
//! full request/response cycle: token grants, bearer headers, the single
//! 401 retry, status classification and the endpoint wire format.

mod auth;
mod endpoints;
mod errors;

use dhl_parcel_client::DhlClient;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USER_ID: &str = "test-user";
pub const API_KEY: &str = "test-key";

/// Helper to create a mock server
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client without credentials pointing at the mock server
pub fn anonymous_client(server: &MockServer) -> DhlClient {
    DhlClient::builder()
        .base_url(server.uri())
        .timeout_millis(2_000)
        .build()
        .expect("Failed to build client")
}

/// Client with api-key credentials pointing at the mock server
pub fn authenticated_client(server: &MockServer) -> DhlClient {
    DhlClient::builder()
        .base_url(server.uri())
        .credentials(USER_ID, API_KEY)
        .timeout_millis(2_000)
        .build()
        .expect("Failed to build client")
}

/// Token grant mock answering with `token`, valid for `expires_in` seconds
pub fn grant_mock(token: &str, expires_in: i64) -> Mock {
    Mock::given(method("POST"))
        .and(path("/authenticate/api-key"))
        .and(body_json(json!({
            "client_id": USER_ID,
            "client_secret": API_KEY
        })))
        .respond_with(success_response(json!({
            "accessToken": token,
            "expires_in": expires_in
        })))
}

/// Helper to create success response templates
pub fn success_response(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// Helper to create error response templates
pub fn error_response(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "key": "error", "message": message }))
}

/// Authorization headers of all requests the server saw, in order
pub async fn authorization_headers(server: &MockServer) -> Vec<Option<String>> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() != "/authenticate/api-key")
        .map(|request| {
            request
                .headers
                .get("authorization")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        })
        .collect()
}
