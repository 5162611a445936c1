#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hostlink_common::{ConfigError, ConfigStore};
use hostlink_integration::{Backend, ClientError, Probe, TelemetryClient};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing_subscriber::fmt::MakeWriter;

pub const MOCK_CONFIG_FILE: &str = "mock.yaml";
pub const MOCK_DEFAULT_ENDPOINT: &str = "mock://localhost:4000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockConfig {
    pub endpoint: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            endpoint: MOCK_DEFAULT_ENDPOINT.to_string(),
        }
    }
}

/// Shared counters so tests can observe what the manager did with clients.
#[derive(Debug, Default)]
pub struct Counters {
    pub built: AtomicUsize,
    pub disposed: AtomicUsize,
    pub disposed_ids: Mutex<Vec<usize>>,
}

impl Counters {
    pub fn built(&self) -> usize {
        self.built.load(Ordering::SeqCst)
    }

    pub fn disposed(&self) -> usize {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn disposed_ids(&self) -> Vec<usize> {
        self.disposed_ids.lock().unwrap().clone()
    }
}

#[derive(Debug)]
pub struct MockClient {
    pub id: usize,
    pub endpoint: String,
    fail_dispose: bool,
    counters: Arc<Counters>,
}

#[async_trait]
impl TelemetryClient for MockClient {
    async fn dispose(self) -> anyhow::Result<()> {
        self.counters.disposed.fetch_add(1, Ordering::SeqCst);
        self.counters.disposed_ids.lock().unwrap().push(self.id);
        if self.fail_dispose {
            anyhow::bail!("connection already torn down");
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MockBackend {
    pub name: &'static str,
    pub counters: Arc<Counters>,
    pub fail_load: bool,
    pub fail_build: bool,
    pub fail_dispose: bool,
    pub probe: Mutex<Option<oneshot::Sender<()>>>,
    pub probe_waits: bool,
}

impl MockBackend {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }
}

impl Backend for MockBackend {
    type Config = MockConfig;
    type Client = MockClient;

    fn name(&self) -> &'static str {
        self.name
    }

    fn config_file(&self) -> &'static str {
        MOCK_CONFIG_FILE
    }

    fn default_config(&self) -> MockConfig {
        MockConfig::default()
    }

    fn load_config(&self, store: &ConfigStore) -> Result<MockConfig, ConfigError> {
        if self.fail_load {
            return Err(ConfigError::Read {
                path: store.path_for(MOCK_CONFIG_FILE),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
            });
        }
        store.load_or_create(self.config_file(), || self.default_config())
    }

    fn build_client(&self, config: MockConfig) -> Result<MockClient, ClientError> {
        if self.fail_build {
            return Err(ClientError::Rejected(format!(
                "endpoint {} refused",
                config.endpoint
            )));
        }
        let id = self.counters.built.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MockClient {
            id,
            endpoint: config.endpoint,
            fail_dispose: self.fail_dispose,
            counters: self.counters.clone(),
        })
    }

    fn liveness_probe(&self, _client: &MockClient) -> Option<Probe> {
        let sender = self.probe.lock().unwrap().take()?;
        let waits = self.probe_waits;
        Some(Box::pin(async move {
            if waits {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            }
            let _ = sender.send(());
        }))
    }
}

/// In-memory log sink for asserting on emitted records.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
