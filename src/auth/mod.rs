//! Authentication for the DHL Parcel client.
//!
//! A [`TokenProvider`] hands out bearer tokens to the authenticated
//! transport. [`ApiKeyTokenProvider`] exchanges the api user id and key for
//! an access token at `/authenticate/api-key` and caches it until shortly
//! before it expires. [`AnonymousTokenProvider`] is used when no credentials
//! are configured and never touches the network.

mod api_key;

pub use api_key::{
    ApiKeyTokenProvider, DEFAULT_TOKEN_LIFETIME_SECS, EXPIRY_SAFETY_MARGIN_SECS,
    MIN_TOKEN_LIFETIME_SECS,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::errors::DhlResult;

/// Path of the token endpoint, relative to the base URL.
pub const AUTH_PATH: &str = "/authenticate/api-key";

/// Api-key credentials.
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: SecretString,
}

impl Credentials {
    /// Creates credentials from the api user id and key.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
        }
    }

    /// Returns the api user id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn client_secret(&self) -> &str {
        self.client_secret.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Access token with its (safety-margin adjusted) expiry.
#[derive(Clone)]
pub struct AccessToken {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Creates a new access token.
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: SecretString::new(token.into()),
            expires_at,
        }
    }

    /// Returns the raw token.
    pub fn secret(&self) -> &str {
        self.token.expose_secret()
    }

    /// Returns the instant after which the token is no longer handed out.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Checks if the token is expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Returns the authorization header value.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }

    /// Returns true if both values hold the same token string.
    pub fn same_token(&self, other: &AccessToken) -> bool {
        self.token.expose_secret() == other.token.expose_secret()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Source of bearer tokens for the authenticated transport.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a valid token, or `None` when requests go out unauthenticated.
    async fn get_token(&self) -> DhlResult<Option<AccessToken>>;

    /// Replaces a token the API rejected and returns its successor.
    async fn refresh(&self, rejected: &AccessToken) -> DhlResult<Option<AccessToken>>;
}

/// Token provider for clients without credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousTokenProvider;

#[async_trait]
impl TokenProvider for AnonymousTokenProvider {
    async fn get_token(&self) -> DhlResult<Option<AccessToken>> {
        Ok(None)
    }

    async fn refresh(&self, _rejected: &AccessToken) -> DhlResult<Option<AccessToken>> {
        Ok(None)
    }
}
