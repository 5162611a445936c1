use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "elastic.yaml";
pub const DEFAULT_NODE_URL: &str = "http://localhost:9200";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticConfig {
    /// URL of the search node, e.g. `http://localhost:9200`.
    pub node_url: String,
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            node_url: DEFAULT_NODE_URL.to_string(),
        }
    }
}
