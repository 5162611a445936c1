use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use hostlink_integration::{ClientError, HttpTransport, TelemetryClient};
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::Method;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ElasticConfig;

/// Connection to one search node.
///
/// Cheap to clone: clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct SearchClient {
    transport: HttpTransport,
}

impl SearchClient {
    pub fn new(config: &ElasticConfig) -> Result<Self, ClientError> {
        Ok(Self {
            transport: HttpTransport::new(&config.node_url)?,
        })
    }

    pub fn node_url(&self) -> &str {
        self.transport.endpoint()
    }

    /// `true` when the node answers `HEAD` on its base URL with a success status.
    pub async fn ping(&self) -> Result<bool> {
        let response = self.transport.head_base().await?;
        Ok(response.is_success())
    }

    /// Index `document` into `index`, under `id` when given.
    pub async fn index_document<T: Serialize>(
        &self,
        index: &str,
        id: Option<&str>,
        document: &T,
    ) -> Result<()> {
        if !is_path_name(index) || index.contains('/') {
            bail!("invalid index name {index:?}");
        }
        if let Some(id) = id.filter(|id| !is_path_name(id)) {
            bail!("invalid document id {id:?}");
        }
        let body = serde_json::to_vec(document).context("failed to serialize document")?;
        let headers: [(HeaderName, HeaderValue); 1] =
            [(CONTENT_TYPE, HeaderValue::from_static("application/json"))];

        let (method, url) = match id {
            Some(id) => (Method::PUT, self.transport.url([index, "_doc", id])?),
            None => (Method::POST, self.transport.url([index, "_doc"])?),
        };
        let response = self
            .transport
            .send(method, &url, &headers, Bytes::from(body))
            .await
            .with_context(|| format!("failed to index document into {index}"))?;

        if !response.is_success() {
            bail!(
                "indexing into {index} failed with {}: {}",
                response.status,
                response.body_text()
            );
        }
        debug!(index, "document indexed");
        Ok(())
    }

    /// Ping the node once and log the outcome.
    pub async fn ping_test(&self) {
        match self.ping().await {
            Ok(true) => info!(node = self.node_url(), "search node responded"),
            Ok(false) => warn!(node = self.node_url(), "search node not responding"),
            Err(err) => warn!(
                node = self.node_url(),
                error = format!("{err:#}"),
                "search node not responding"
            ),
        }
    }
}

#[async_trait]
impl TelemetryClient for SearchClient {
    async fn dispose(self) -> Result<()> {
        debug!(node = self.node_url(), "closing search client");
        Ok(())
    }
}

/// Empty and dot segments would be dropped from the request path.
fn is_path_name(raw: &str) -> bool {
    !matches!(raw, "" | "." | "..")
}
