//! Attach/detach state machine wrapped around one backend.

use std::fmt;

use hostlink_common::{error_chain, ConfigStore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument, Span};

use crate::backend::{Backend, TelemetryClient};
use crate::error::AttachError;
use crate::host::HostContext;

/// Observable lifecycle state of a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Unattached,
    Attached,
}

impl ManagerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unattached => "unattached",
            Self::Attached => "attached",
        }
    }
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

struct ProbeHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ProbeHandle {
    fn cancel(self) {
        if !self.task.is_finished() {
            self.cancel.cancel();
        }
    }
}

/// Owns at most one live client for a backend.
///
/// `attach` and `detach` never fail: every error raised while loading config
/// or constructing the client is logged and leaves the manager unattached.
/// Callers serialize access to a given manager; nothing here locks.
pub struct IntegrationManager<B: Backend> {
    backend: B,
    store: ConfigStore,
    span: Span,
    client: Option<B::Client>,
    probe: Option<ProbeHandle>,
    last_failure: Option<AttachError>,
}

impl<B: Backend> IntegrationManager<B> {
    pub fn new(backend: B, host: &HostContext) -> Self {
        let span = info_span!("integration", backend = backend.name(), host = host.instance());
        Self {
            backend,
            store: host.config_store(),
            span,
            client: None,
            probe: None,
            last_failure: None,
        }
    }

    /// Replace the span every record of this manager is emitted under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn state(&self) -> ManagerState {
        if self.client.is_some() {
            ManagerState::Attached
        } else {
            ManagerState::Unattached
        }
    }

    pub fn is_attached(&self) -> bool {
        self.client.is_some()
    }

    pub fn client(&self) -> Option<&B::Client> {
        self.client.as_ref()
    }

    pub fn client_mut(&mut self) -> Option<&mut B::Client> {
        self.client.as_mut()
    }

    /// Reason the most recent attach attempt failed, cleared by a successful one.
    pub fn last_failure(&self) -> Option<&AttachError> {
        self.last_failure.as_ref()
    }

    /// Load config and build a client without touching manager state.
    pub fn try_attach(&self) -> Result<B::Client, AttachError> {
        let backend = self.backend.name();
        let config = self
            .backend
            .load_config(&self.store)
            .map_err(|source| AttachError::Config { backend, source })?;
        self.backend
            .build_client(config)
            .map_err(|source| AttachError::ClientConstruction { backend, source })
    }

    /// Bind to the backend, re-initializing if already attached.
    pub async fn attach(&mut self) {
        if self.client.is_some() {
            self.release("reattach").await;
        }

        let outcome = {
            let _entered = self.span.enter();
            self.try_attach()
        };

        match outcome {
            Ok(client) => {
                self.start_probe(&client);
                self.client = Some(client);
                self.last_failure = None;
                info!(parent: &self.span, "attached");
            }
            Err(err) => {
                error!(
                    parent: &self.span,
                    error = %error_chain(&err),
                    "attach failed; integration stays unattached"
                );
                self.last_failure = Some(err);
            }
        }
    }

    /// Dispose the client, if any. Calling it while unattached does nothing.
    pub async fn detach(&mut self) {
        self.release("detach").await;
    }

    async fn release(&mut self, reason: &'static str) {
        if let Some(probe) = self.probe.take() {
            probe.cancel();
        }

        let Some(client) = self.client.take() else {
            return;
        };

        match client.dispose().instrument(self.span.clone()).await {
            Ok(()) => info!(parent: &self.span, reason, "client disposed"),
            Err(err) => warn!(
                parent: &self.span,
                reason,
                error = format!("{err:#}"),
                "client disposal failed"
            ),
        }
    }

    fn start_probe(&mut self, client: &B::Client) {
        let Some(probe) = self.backend.liveness_probe(client) else {
            return;
        };

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(
            async move {
                tokio::select! {
                    _ = token.cancelled() => debug!("liveness probe cancelled"),
                    _ = probe => {}
                }
            }
            .instrument(self.span.clone()),
        );
        self.probe = Some(ProbeHandle { cancel, task });
    }
}

impl<B: Backend> fmt::Debug for IntegrationManager<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationManager")
            .field("backend", &self.backend.name())
            .field("state", &self.state())
            .field("store", &self.store.root())
            .finish()
    }
}
