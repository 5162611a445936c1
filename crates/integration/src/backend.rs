//! Contracts a backend implements to plug into an [`IntegrationManager`].
//!
//! [`IntegrationManager`]: crate::IntegrationManager

use async_trait::async_trait;
use futures::future::BoxFuture;
use hostlink_common::{ConfigError, ConfigStore};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ClientError;

/// Detached, best-effort check started after a successful attach.
pub type Probe = BoxFuture<'static, ()>;

/// A live connection to one external backend.
#[async_trait]
pub trait TelemetryClient: Send + Sync + 'static {
    /// Release the connection and flush anything the client still buffers.
    ///
    /// Consumes the client, so a given instance is disposed at most once.
    async fn dispose(self) -> anyhow::Result<()>;
}

/// Static description of a backend: its config file and how to turn the
/// config into a client.
pub trait Backend: Send + Sync + 'static {
    type Config: Serialize + DeserializeOwned + Send;
    type Client: TelemetryClient;

    /// Backend identity used for registry lookup and log records.
    fn name(&self) -> &'static str;

    /// Fixed file name of the backend config inside the host working directory.
    fn config_file(&self) -> &'static str;

    fn default_config(&self) -> Self::Config;

    fn load_config(&self, store: &ConfigStore) -> Result<Self::Config, ConfigError> {
        store.load_or_create(self.config_file(), || self.default_config())
    }

    fn build_client(&self, config: Self::Config) -> Result<Self::Client, ClientError>;

    /// Connectivity check to run in the background once `client` is installed.
    fn liveness_probe(&self, _client: &Self::Client) -> Option<Probe> {
        None
    }
}
