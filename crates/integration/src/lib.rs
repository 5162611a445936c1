//! Lifecycle framework binding a host process to independent telemetry
//! backends.
//!
//! Each backend is wrapped in an [`IntegrationManager`] that loads (or
//! bootstraps) its config file, builds a [`TelemetryClient`] and owns it until
//! detach. Attach failures are contained at the manager: they are logged and
//! the manager stays unattached, so one broken backend never takes the host or
//! its siblings down. A [`ManagerRegistry`] drives a set of managers together.

pub mod backend;
pub mod error;
pub mod host;
pub mod manager;
pub mod registry;
pub mod transport;

pub use backend::{Backend, Probe, TelemetryClient};
pub use error::{AttachError, ClientError, RegistryError};
pub use host::HostContext;
pub use manager::{IntegrationManager, ManagerState};
pub use registry::{Lifecycle, ManagerRegistry};
pub use transport::{HttpResponse, HttpTransport};
