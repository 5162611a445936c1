//! Error taxonomy for the attach boundary.

use hostlink_common::ConfigError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A backend refused to build a client from an otherwise valid config.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("failed to read credential file {}", path.display())]
    Credential {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid credential file {}: {reason}", path.display())]
    InvalidCredential { path: PathBuf, reason: String },
    #[error("client rejected configuration: {0}")]
    Rejected(String),
}

/// Why an attach attempt left the manager unattached.
#[derive(Debug, Error)]
pub enum AttachError {
    #[error("failed to load {backend} config")]
    Config {
        backend: &'static str,
        #[source]
        source: ConfigError,
    },
    #[error("failed to construct {backend} client")]
    ClientConstruction {
        backend: &'static str,
        #[source]
        source: ClientError,
    },
}

impl AttachError {
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Config { backend, .. } | Self::ClientConstruction { backend, .. } => backend,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a manager for backend {0:?} is already registered")]
    Duplicate(&'static str),
}
