use hostlink_integration::{Backend, ClientError, IntegrationManager, Probe};

use crate::client::SearchClient;
use crate::config::{ElasticConfig, CONFIG_FILE};

pub const BACKEND_NAME: &str = "search";

pub type SearchManager = IntegrationManager<SearchBackend>;

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchBackend;

impl Backend for SearchBackend {
    type Config = ElasticConfig;
    type Client = SearchClient;

    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn config_file(&self) -> &'static str {
        CONFIG_FILE
    }

    fn default_config(&self) -> ElasticConfig {
        ElasticConfig::default()
    }

    fn build_client(&self, config: ElasticConfig) -> Result<SearchClient, ClientError> {
        SearchClient::new(&config)
    }

    // Attach does not wait for the node; the outcome only shows up in the log.
    fn liveness_probe(&self, client: &SearchClient) -> Option<Probe> {
        let client = client.clone();
        Some(Box::pin(async move { client.ping_test().await }))
    }
}
