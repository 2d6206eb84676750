//! # DHL Parcel Client
//!
//! An async client for the DHL Parcel API: pickup scheduling, label
//! creation, parcel shop lookup and track-and-trace.
//!
//! ## Features
//!
//! - Api-key authentication with token caching and lazy renewal
//! - One token grant in flight at a time, shared by concurrent callers
//! - Automatic single retry with a fresh token on `401 Unauthorized`
//! - Anonymous mode when no credentials are configured
//! - Typed errors separating authentication, transport, API and decode failures
//! - Structured logging with `tracing`, secrets redacted
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dhl_parcel_client::DhlClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DhlClient::builder()
//!         .credentials("api-user-id", "api-key")
//!         .build()?;
//!
//!     let windows = client.time_windows("NL", "1234AB").await?;
//!     println!("{}", windows);
//!
//!     let shops = client.find_parcel_shop_locations("1234AB", "NL").await?;
//!     println!("{}", shops);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error handling
//!
//! ```rust,no_run
//! use dhl_parcel_client::{DhlClient, DhlError};
//!
//! # async fn example(client: DhlClient) {
//! match client.find_label("a8f4c1b0").await {
//!     Ok(label) => println!("{}", label),
//!     Err(DhlError::Api { status, .. }) => println!("rejected with {:?}", status),
//!     Err(e) if e.is_timeout() => println!("timed out"),
//!     Err(e) => println!("failed: {}", e),
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod endpoints;
pub mod errors;
pub mod observability;
pub mod transport;
pub mod types;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use auth::{AccessToken, AnonymousTokenProvider, ApiKeyTokenProvider, Credentials, TokenProvider};
pub use client::{DhlClient, DhlClientBuilder};
pub use config::{DhlConfig, DhlConfigBuilder, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use dispatch::{ApiRequest, RequestDispatcher};
pub use endpoints::{EndpointArgs, EndpointDescriptor, Operation};
pub use errors::{DhlError, DhlResult, TransportErrorKind};
pub use observability::{LogFormat, LogLevel, LoggingConfig};
pub use transport::{
    AuthenticatedTransport, HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport,
};
pub use types::Parcel;
