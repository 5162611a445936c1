//! Metrics sink integration.
//!
//! [`MetricsClient`] turns [`Point`]s into line protocol and queues them on a
//! buffered writer that posts to an InfluxDB v2 compatible `/api/v2/write`
//! endpoint. Writes never fail from the caller's point of view.

pub mod backend;
pub mod client;
pub mod config;
pub mod point;
pub mod write;

pub use backend::{MetricsBackend, MetricsManager, BACKEND_NAME};
pub use client::{MetricsClient, PING_FIELD, PING_MEASUREMENT};
pub use config::{InfluxDbConfig, WriteDestination, CONFIG_FILE};
pub use point::{FieldValue, Point, WritePrecision};
pub use write::{BufferedWriteApi, PointWriter};
