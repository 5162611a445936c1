//! Load-or-create helpers for per-backend YAML config files.
//!
//! A missing file is never an error: the defaults are written to disk so the
//! operator has something to edit, and the same value is handed back to the
//! caller.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

/// Failure to produce a config value from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to serialize default config for {}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to write default config {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConfigError {
    /// Path of the config file involved in the failure.
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::Serialize { path, .. }
            | Self::Write { path, .. } => path,
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

/// Directory holding the config files of every backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the process working directory.
    pub fn from_current_dir() -> io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// Load `file_name` from the store, creating it from `defaults` when absent.
    pub fn load_or_create<C, F>(&self, file_name: &str, defaults: F) -> Result<C, ConfigError>
    where
        C: Serialize + DeserializeOwned,
        F: FnOnce() -> C,
    {
        load_or_create(&self.path_for(file_name), defaults)
    }
}

/// Load the config at `path`, or write `defaults()` there and return it.
///
/// The file is only touched on the create path. Existing content is parsed
/// as-is; a malformed file is reported as [`ConfigError::Parse`] and left
/// untouched so the operator can fix it.
pub fn load_or_create<C, F>(path: &Path, defaults: F) -> Result<C, ConfigError>
where
    C: Serialize + DeserializeOwned,
    F: FnOnce() -> C,
{
    match fs::read_to_string(path) {
        Ok(contents) => {
            info!(path = %path.display(), "Loading config");
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "Generating default config");
            let config = defaults();
            write_config(path, &config)?;
            Ok(config)
        }
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_config<C: Serialize>(path: &Path, config: &C) -> Result<(), ConfigError> {
    let write_err = |source: io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    let body = serde_yaml::to_string(config).map_err(|source| ConfigError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(body.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|err| write_err(err.error))?;
    Ok(())
}
