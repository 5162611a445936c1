use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "influxdb.yaml";
pub const DEFAULT_HOST: &str = "http://localhost:8086";
pub const DEFAULT_BUCKET: &str = "telemetry";
pub const DEFAULT_ORGANIZATION: &str = "default";

/// Connection and destination settings for the metrics sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluxDbConfig {
    /// Base URL of the InfluxDB instance.
    pub host: String,
    /// API token; an empty token sends unauthenticated writes.
    pub token: String,
    pub bucket: String,
    pub organization: String,
}

impl Default for InfluxDbConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            token: String::new(),
            bucket: DEFAULT_BUCKET.to_string(),
            organization: DEFAULT_ORGANIZATION.to_string(),
        }
    }
}

/// Bucket/organization pair every write is tagged with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteDestination {
    pub bucket: String,
    pub organization: String,
}

impl From<&InfluxDbConfig> for WriteDestination {
    fn from(config: &InfluxDbConfig) -> Self {
        Self {
            bucket: config.bucket.clone(),
            organization: config.organization.clone(),
        }
    }
}
