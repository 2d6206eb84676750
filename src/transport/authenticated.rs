//! Bearer authentication around a base transport.

use async_trait::async_trait;
use std::sync::Arc;

use super::{HttpRequest, HttpResponse, HttpTransport};
use crate::auth::{AccessToken, TokenProvider};
use crate::errors::DhlResult;

const UNAUTHORIZED: u16 = 401;

/// Transport that attaches `Authorization: Bearer <token>` to every request.
///
/// A 401 answer triggers exactly one forced token refresh and one retry; the
/// retry's response is returned whatever its status.
pub struct AuthenticatedTransport {
    inner: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenProvider>,
}

impl AuthenticatedTransport {
    /// Wraps `inner` with tokens from `tokens`.
    pub fn new(inner: Arc<dyn HttpTransport>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { inner, tokens }
    }

    fn authorize(mut request: HttpRequest, token: &AccessToken) -> HttpRequest {
        request
            .headers
            .insert("Authorization".to_string(), token.authorization_header());
        request
    }
}

#[async_trait]
impl HttpTransport for AuthenticatedTransport {
    async fn send(&self, request: HttpRequest) -> DhlResult<HttpResponse> {
        let Some(token) = self.tokens.get_token().await? else {
            return self.inner.send(request).await;
        };

        let response = self
            .inner
            .send(Self::authorize(request.clone(), &token))
            .await?;

        if response.status != UNAUTHORIZED {
            return Ok(response);
        }

        tracing::debug!(url = %request.url, "Request rejected with 401, retrying with a new token");

        match self.tokens.refresh(&token).await? {
            Some(fresh) => self.inner.send(Self::authorize(request, &fresh)).await,
            None => Ok(response),
        }
    }
}

impl std::fmt::Debug for AuthenticatedTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedTransport").finish_non_exhaustive()
    }
}
