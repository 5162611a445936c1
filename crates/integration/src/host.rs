use hostlink_common::ConfigStore;
use std::io;
use std::path::{Path, PathBuf};

/// Identity of the process that owns the managers.
///
/// Managers only read it at construction: the instance name goes into their
/// log span and the working directory roots their config files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostContext {
    instance: String,
    working_dir: PathBuf,
}

impl HostContext {
    pub fn new(instance: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            instance: instance.into(),
            working_dir: working_dir.into(),
        }
    }

    /// Context rooted at the process working directory.
    pub fn from_current_dir(instance: impl Into<String>) -> io::Result<Self> {
        Ok(Self::new(instance, std::env::current_dir()?))
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn config_store(&self) -> ConfigStore {
        ConfigStore::new(&self.working_dir)
    }
}
