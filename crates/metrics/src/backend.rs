use hostlink_integration::{Backend, ClientError, IntegrationManager};

use crate::client::MetricsClient;
use crate::config::{InfluxDbConfig, CONFIG_FILE};

pub const BACKEND_NAME: &str = "metrics";

/// Manager driving the metrics sink.
pub type MetricsManager = IntegrationManager<MetricsBackend>;

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsBackend;

impl Backend for MetricsBackend {
    type Config = InfluxDbConfig;
    type Client = MetricsClient;

    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn config_file(&self) -> &'static str {
        CONFIG_FILE
    }

    fn default_config(&self) -> InfluxDbConfig {
        InfluxDbConfig::default()
    }

    fn build_client(&self, config: InfluxDbConfig) -> Result<MetricsClient, ClientError> {
        MetricsClient::new(&config)
    }
}
