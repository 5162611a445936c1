use hostlink_common::{ConfigError, ConfigStore};
use hostlink_integration::{Backend, ClientError, IntegrationManager};

use crate::client::PushClient;
use crate::config::{FirebaseConfig, CONFIG_FILE};

pub const BACKEND_NAME: &str = "push";

pub type PushManager = IntegrationManager<PushBackend>;

#[derive(Debug, Clone, Copy, Default)]
pub struct PushBackend;

impl Backend for PushBackend {
    type Config = FirebaseConfig;
    type Client = PushClient;

    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn config_file(&self) -> &'static str {
        CONFIG_FILE
    }

    fn default_config(&self) -> FirebaseConfig {
        FirebaseConfig::default()
    }

    fn load_config(&self, store: &ConfigStore) -> Result<FirebaseConfig, ConfigError> {
        let config: FirebaseConfig =
            store.load_or_create(self.config_file(), || self.default_config())?;
        Ok(config.resolved_against(store.root()))
    }

    fn build_client(&self, config: FirebaseConfig) -> Result<PushClient, ClientError> {
        PushClient::new(&config)
    }
}
