//! Api-key grant against `/authenticate/api-key`.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::{AccessToken, Credentials, TokenProvider, AUTH_PATH};
use crate::config::DhlConfig;
use crate::errors::{DhlError, DhlResult};
use crate::transport::{HttpRequest, HttpTransport, Method};

/// Token lifetime assumed when the grant response carries no expiry.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 900;

/// Tokens are retired this long before their reported expiry (capped at half
/// the lifetime for very short-lived tokens).
pub const EXPIRY_SAFETY_MARGIN_SECS: i64 = 30;

/// Shortest lifetime accepted from the grant response. Zero, negative or
/// already-passed expiries are raised to this, so a freshly granted token is
/// always valid when it is handed out.
pub const MIN_TOKEN_LIFETIME_SECS: i64 = 2;

const MAX_TOKEN_LIFETIME_SECS: i64 = 86_400;

#[derive(Serialize)]
struct GrantRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Deserialize)]
struct GrantResponse {
    #[serde(alias = "accessToken")]
    access_token: String,
    /// Relative lifetime in seconds.
    #[serde(default)]
    expires_in: Option<i64>,
    /// Absolute expiry as a Unix timestamp in seconds.
    #[serde(default, rename = "accessTokenExpiration")]
    access_token_expiration: Option<i64>,
}

impl GrantResponse {
    fn lifetime(&self, now: DateTime<Utc>) -> Duration {
        let secs = match (self.expires_in, self.access_token_expiration) {
            (Some(expires_in), _) => expires_in,
            (None, Some(timestamp)) => timestamp.saturating_sub(now.timestamp()),
            (None, None) => DEFAULT_TOKEN_LIFETIME_SECS,
        };

        Duration::seconds(secs.clamp(MIN_TOKEN_LIFETIME_SECS, MAX_TOKEN_LIFETIME_SECS))
    }
}

/// Token provider backed by the DHL api-key grant.
///
/// The token is cached behind an `RwLock`. Refreshes are serialized behind a
/// separate mutex: a caller that finds the cache stale takes the mutex,
/// checks the cache again, and only then contacts the token endpoint, so
/// callers that queued behind an in-flight refresh reuse its token.
pub struct ApiKeyTokenProvider {
    credentials: Credentials,
    token_url: String,
    timeout: std::time::Duration,
    transport: Arc<dyn HttpTransport>,
    cached_token: RwLock<Option<AccessToken>>,
    refresh_lock: Mutex<()>,
}

impl ApiKeyTokenProvider {
    /// Creates a provider that requests tokens at `token_url`.
    pub fn new(
        credentials: Credentials,
        token_url: impl Into<String>,
        timeout: std::time::Duration,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            credentials,
            token_url: token_url.into(),
            timeout,
            transport,
            cached_token: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Creates a provider for the token endpoint of the configured base URL.
    pub fn from_config(
        config: &DhlConfig,
        credentials: Credentials,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self::new(
            credentials,
            config.endpoint_url(AUTH_PATH),
            config.timeout,
            transport,
        )
    }

    /// Drops the cached token; the next call requests a new one.
    pub async fn invalidate(&self) {
        *self.cached_token.write().await = None;
    }

    async fn cached_valid_token(&self) -> Option<AccessToken> {
        self.cached_token
            .read()
            .await
            .as_ref()
            .filter(|token| !token.is_expired())
            .cloned()
    }

    /// Requests a new token and stores it. Callers must hold `refresh_lock`.
    async fn fetch_and_store(&self) -> DhlResult<AccessToken> {
        let token = self.request_token().await?;
        *self.cached_token.write().await = Some(token.clone());
        Ok(token)
    }

    async fn request_token(&self) -> DhlResult<AccessToken> {
        let grant = GrantRequest {
            client_id: self.credentials.client_id(),
            client_secret: self.credentials.client_secret(),
        };
        let body = serde_json::to_vec(&grant).map_err(|e| DhlError::Serialization {
            message: e.to_string(),
        })?;

        let mut request = HttpRequest::new(Method::Post, self.token_url.clone(), self.timeout)
            .with_json_body(Bytes::from(body));
        request
            .headers
            .insert("Accept".to_string(), "application/json".to_string());

        tracing::debug!(url = %self.token_url, "Requesting DHL Parcel access token");
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let body = String::from_utf8_lossy(&response.body).into_owned();
            return Err(DhlError::Authentication {
                message: format!("Token request failed with status {}", response.status),
                status: Some(response.status),
                body: Some(body),
            });
        }

        let grant: GrantResponse =
            serde_json::from_slice(&response.body).map_err(|e| DhlError::Authentication {
                message: format!("Failed to parse token response: {}", e),
                status: Some(response.status),
                body: Some(String::from_utf8_lossy(&response.body).into_owned()),
            })?;

        if grant.access_token.is_empty() {
            return Err(DhlError::Authentication {
                message: "Token response contained an empty access token".to_string(),
                status: Some(response.status),
                body: Some(String::from_utf8_lossy(&response.body).into_owned()),
            });
        }

        let now = Utc::now();
        let lifetime = grant.lifetime(now);
        let margin = std::cmp::min(Duration::seconds(EXPIRY_SAFETY_MARGIN_SECS), lifetime / 2);
        let expires_at = now + lifetime - margin;

        tracing::info!(%expires_at, "Acquired DHL Parcel access token");
        Ok(AccessToken::new(grant.access_token, expires_at))
    }
}

#[async_trait]
impl TokenProvider for ApiKeyTokenProvider {
    async fn get_token(&self) -> DhlResult<Option<AccessToken>> {
        if let Some(token) = self.cached_valid_token().await {
            return Ok(Some(token));
        }

        let _guard = self.refresh_lock.lock().await;

        // Refreshed by whoever held the lock before us.
        if let Some(token) = self.cached_valid_token().await {
            return Ok(Some(token));
        }

        self.fetch_and_store().await.map(Some)
    }

    async fn refresh(&self, rejected: &AccessToken) -> DhlResult<Option<AccessToken>> {
        let _guard = self.refresh_lock.lock().await;

        {
            let mut cached = self.cached_token.write().await;
            match cached.as_ref() {
                Some(current) if !current.same_token(rejected) && !current.is_expired() => {
                    return Ok(Some(current.clone()));
                }
                _ => *cached = None,
            }
        }

        tracing::debug!("Access token rejected, requesting a new one");
        self.fetch_and_store().await.map(Some)
    }
}

impl std::fmt::Debug for ApiKeyTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyTokenProvider")
            .field("credentials", &self.credentials)
            .field("token_url", &self.token_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
