//! DHL Parcel API client.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AnonymousTokenProvider, ApiKeyTokenProvider, TokenProvider};
use crate::config::{DhlConfig, DhlConfigBuilder};
use crate::dispatch::RequestDispatcher;
use crate::endpoints::{join_references, EndpointArgs, Operation};
use crate::errors::{DhlError, DhlResult};
use crate::transport::{AuthenticatedTransport, HttpTransport, ReqwestTransport};
use crate::types::Parcel;

/// The main DHL Parcel client.
///
/// Cheap to share: wrap it in an `Arc` and call it from as many tasks as
/// needed. All calls share one token cache.
pub struct DhlClient {
    config: DhlConfig,
    dispatcher: RequestDispatcher,
}

impl DhlClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: DhlConfig) -> DhlResult<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config.user_agent)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Creates a client that sends every request, token grants included,
    /// through `transport`.
    pub fn with_transport(config: DhlConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let tokens: Arc<dyn TokenProvider> = match config.credentials() {
            Some(credentials) => Arc::new(ApiKeyTokenProvider::from_config(
                &config,
                credentials.clone(),
                transport.clone(),
            )),
            None => Arc::new(AnonymousTokenProvider),
        };

        let authenticated = Arc::new(AuthenticatedTransport::new(transport, tokens));
        let dispatcher = RequestDispatcher::new(config.base_url.clone(), authenticated);

        Self { config, dispatcher }
    }

    /// Creates a new client builder.
    pub fn builder() -> DhlClientBuilder {
        DhlClientBuilder::new()
    }

    /// Creates a client from the environment.
    pub fn from_env() -> DhlResult<Self> {
        Self::new(DhlConfig::from_env()?)
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &DhlConfig {
        &self.config
    }

    /// Runs any operation from the endpoint table.
    pub async fn call(&self, operation: Operation, args: EndpointArgs<'_>) -> DhlResult<Value> {
        let request = operation.descriptor().resolve(args, self.config.timeout)?;
        self.dispatcher.call(request).await
    }

    /// Retrieves delivery time windows for a postal code.
    pub async fn time_windows(&self, country_code: &str, postal_code: &str) -> DhlResult<Value> {
        self.call(
            Operation::TimeWindows,
            EndpointArgs::new()
                .arg("countryCode", country_code)
                .arg("postalCode", postal_code),
        )
        .await
    }

    /// Schedules a pickup.
    pub async fn create_pickup_request<T: Serialize + ?Sized>(
        &self,
        pickup_request: &T,
    ) -> DhlResult<Value> {
        self.call(
            Operation::CreatePickupRequest,
            EndpointArgs::new().body(to_body(pickup_request)?),
        )
        .await
    }

    /// Creates a shipping label.
    pub async fn create_label<T: Serialize + ?Sized>(&self, label: &T) -> DhlResult<Parcel> {
        let descriptor = Operation::CreateLabel.descriptor();
        let value = self
            .call(Operation::CreateLabel, EndpointArgs::new().body(to_body(label)?))
            .await?;
        Parcel::from_value(descriptor.name, value)
    }

    /// Tracks one or more shipments by reference.
    pub async fn track_and_trace<S: AsRef<str>>(&self, references: &[S]) -> DhlResult<Value> {
        let key = join_references(references);
        if key.is_empty() {
            return Err(DhlError::invalid_parameter(
                "key",
                "at least one reference is required",
            ));
        }

        self.call(Operation::TrackAndTrace, EndpointArgs::new().arg("key", &key))
            .await
    }

    /// Finds parcel shops near a postal code.
    pub async fn find_parcel_shop_locations(
        &self,
        postal_code: &str,
        country: &str,
    ) -> DhlResult<Value> {
        self.call(
            Operation::FindParcelShopLocations,
            EndpointArgs::new()
                .arg("zipCode", postal_code)
                .arg("country", country),
        )
        .await
    }

    /// Retrieves a single parcel shop.
    pub async fn find_parcel_shop(&self, country: &str, id: &str) -> DhlResult<Value> {
        self.call(
            Operation::FindParcelShop,
            EndpointArgs::new().arg("country", country).arg("id", id),
        )
        .await
    }

    /// Retrieves an existing label.
    pub async fn find_label(&self, label_id: &str) -> DhlResult<Value> {
        self.call(Operation::FindLabel, EndpointArgs::new().arg("labelId", label_id))
            .await
    }

    /// Retrieves proof-of-delivery information for a piece.
    pub async fn pieces(&self, piece_id: &str, zip_code: &str) -> DhlResult<Value> {
        self.call(
            Operation::Pieces,
            EndpointArgs::new()
                .arg("pieceId", piece_id)
                .arg("zipCode", zip_code),
        )
        .await
    }
}

impl std::fmt::Debug for DhlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhlClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn to_body<T: Serialize + ?Sized>(body: &T) -> DhlResult<Value> {
    serde_json::to_value(body).map_err(|e| DhlError::Serialization {
        message: e.to_string(),
    })
}

/// Builder for the DHL Parcel client.
#[derive(Default)]
pub struct DhlClientBuilder {
    config: DhlConfigBuilder,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl DhlClientBuilder {
    /// Creates a new client builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the api-key credentials.
    pub fn credentials(mut self, user_id: impl Into<String>, key: impl Into<String>) -> Self {
        self.config = self.config.credentials(user_id, key);
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.base_url(url);
        self
    }

    /// Sets the per-call timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Sets the per-call timeout in milliseconds.
    pub fn timeout_millis(mut self, millis: u64) -> Self {
        self.config = self.config.timeout_millis(millis);
        self
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config = self.config.user_agent(user_agent);
        self
    }

    /// Uses a custom transport instead of the default reqwest one.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the client.
    pub fn build(self) -> DhlResult<DhlClient> {
        let config = self.config.build()?;
        match self.transport {
            Some(transport) => Ok(DhlClient::with_transport(config, transport)),
            None => DhlClient::new(config),
        }
    }
}
