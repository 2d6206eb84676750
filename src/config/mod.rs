//! Configuration module for the DHL Parcel client.
//!
//! Provides the immutable session configuration: base URL, per-call timeout
//! and the optional api-key credentials.

use std::time::Duration;

use crate::auth::Credentials;
use crate::errors::{DhlError, DhlResult};

/// Default base URL for the DHL Parcel API.
pub const DEFAULT_BASE_URL: &str = "https://api-gw.dhlparcel.nl";

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("dhl-parcel-client/", env!("CARGO_PKG_VERSION"));

/// Configuration for the DHL Parcel client.
#[derive(Clone)]
pub struct DhlConfig {
    /// Base URL for API requests, without a trailing slash.
    pub base_url: String,
    /// Per-call timeout.
    pub timeout: Duration,
    /// User agent header value.
    pub user_agent: String,
    /// Api-key credentials; `None` runs the client anonymously.
    pub(crate) credentials: Option<Credentials>,
}

impl DhlConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> DhlConfigBuilder {
        DhlConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DHL_PARCEL_USER_ID` (optional): api user id
    /// - `DHL_PARCEL_API_KEY` (optional): api key
    /// - `DHL_PARCEL_BASE_URL` (optional): custom base URL
    /// - `DHL_PARCEL_TIMEOUT_MS` (optional): per-call timeout in milliseconds
    pub fn from_env() -> DhlResult<Self> {
        let mut builder = DhlConfigBuilder::new();

        if let (Ok(user_id), Ok(key)) = (
            std::env::var("DHL_PARCEL_USER_ID"),
            std::env::var("DHL_PARCEL_API_KEY"),
        ) {
            builder = builder.credentials(user_id, key);
        }

        if let Ok(base_url) = std::env::var("DHL_PARCEL_BASE_URL") {
            builder = builder.base_url(base_url);
        }

        if let Ok(timeout) = std::env::var("DHL_PARCEL_TIMEOUT_MS") {
            let millis = timeout.parse::<u64>().map_err(|_| DhlError::Configuration {
                message: format!("DHL_PARCEL_TIMEOUT_MS is not a number: {}", timeout),
            })?;
            builder = builder.timeout_millis(millis);
        }

        builder.build()
    }

    /// Returns the credentials, if the client authenticates.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Returns true when no credentials are configured.
    pub fn is_anonymous(&self) -> bool {
        self.credentials.is_none()
    }

    /// Returns the full URL for an API path.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl std::fmt::Debug for DhlConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhlConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("credentials", &self.credentials)
            .finish()
    }
}

/// Builder for `DhlConfig`.
#[derive(Default)]
pub struct DhlConfigBuilder {
    user_id: Option<String>,
    key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl DhlConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the api user id and key.
    pub fn credentials(mut self, user_id: impl Into<String>, key: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self.key = Some(key.into());
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the per-call timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the per-call timeout in milliseconds.
    pub fn timeout_millis(self, millis: u64) -> Self {
        self.timeout(Duration::from_millis(millis))
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> DhlResult<DhlConfig> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(DhlError::Configuration {
                message: "Base URL must start with http:// or https://".to_string(),
            });
        }
        url::Url::parse(&base_url)?;

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(DhlError::Configuration {
                message: "Timeout must be greater than zero".to_string(),
            });
        }

        let credentials = match (self.user_id, self.key) {
            (Some(user_id), Some(key)) if !user_id.is_empty() && !key.is_empty() => {
                Some(Credentials::new(user_id, key))
            }
            (None, None) => None,
            _ => {
                tracing::warn!("Incomplete DHL Parcel credentials, continuing without authentication");
                None
            }
        };

        Ok(DhlConfig {
            base_url,
            timeout,
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            credentials,
        })
    }
}
