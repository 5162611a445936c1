use async_trait::async_trait;
use chrono::Utc;
use hostlink_integration::{ClientError, HttpTransport, TelemetryClient};
use tracing::info;

use crate::config::{InfluxDbConfig, WriteDestination};
use crate::point::{Point, WritePrecision};
use crate::write::{BufferedWriteApi, PointWriter};

/// Measurement used by [`MetricsClient::write_ping`].
pub const PING_MEASUREMENT: &str = "ping";
/// Field carrying the ping message.
pub const PING_FIELD: &str = "message";

/// Handle on the metrics sink: one connection pool plus its write buffer.
pub struct MetricsClient {
    endpoint: String,
    destination: WriteDestination,
    writer: Box<dyn PointWriter>,
}

impl MetricsClient {
    /// Validate the endpoint and start the buffered writer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: &InfluxDbConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(&config.host)?;
        let endpoint = transport.endpoint().to_string();
        let writer = BufferedWriteApi::start(transport, &config.token)?;
        Ok(Self {
            endpoint,
            destination: WriteDestination::from(config),
            writer: Box::new(writer),
        })
    }

    /// Client writing through a caller-supplied sink.
    pub fn with_writer(config: &InfluxDbConfig, writer: impl PointWriter) -> Self {
        Self {
            endpoint: config.host.clone(),
            destination: WriteDestination::from(config),
            writer: Box::new(writer),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn destination(&self) -> &WriteDestination {
        &self.destination
    }

    /// New point stamped with the current UTC time at second precision.
    pub fn make_point(&self, measurement: impl Into<String>) -> Point {
        Point::measurement(measurement).timestamp(Utc::now(), WritePrecision::Seconds)
    }

    /// Queue `points` for the configured bucket and organization.
    ///
    /// Never reports backend failures; those are logged by the writer.
    pub fn write_points(&self, points: impl IntoIterator<Item = Point>) {
        self.writer
            .write(&self.destination, points.into_iter().collect());
    }

    /// Write a single checkpoint point carrying `message`.
    pub fn write_ping(&self, message: &str) {
        let point = self.make_point(PING_MEASUREMENT).field(PING_FIELD, message);
        self.write_points([point]);
        info!("ping done: {message}");
    }
}

#[async_trait]
impl TelemetryClient for MetricsClient {
    async fn dispose(self) -> anyhow::Result<()> {
        self.writer.close().await
    }
}

impl std::fmt::Debug for MetricsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsClient")
            .field("endpoint", &self.endpoint)
            .field("destination", &self.destination)
            .finish()
    }
}
