use async_trait::async_trait;
use hostlink_integration::{ClientError, TelemetryClient};
use tracing::{debug, info};

use crate::config::FirebaseConfig;
use crate::credential::GoogleCredential;

pub const DEFAULT_APP_NAME: &str = "[DEFAULT]";
const MESSAGING_API: &str = "https://fcm.googleapis.com/v1/projects";

/// Options a push app is created with.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub credential: GoogleCredential,
    pub project_id: Option<String>,
}

/// A named app instance bound to one credential.
#[derive(Debug, Clone)]
pub struct PushApp {
    name: String,
    options: AppOptions,
}

impl PushApp {
    pub fn create(options: AppOptions) -> Result<Self, ClientError> {
        Self::create_named(DEFAULT_APP_NAME, options)
    }

    pub fn create_named(name: &str, mut options: AppOptions) -> Result<Self, ClientError> {
        if name.trim().is_empty() {
            return Err(ClientError::Rejected("app name must not be empty".to_string()));
        }
        if options.project_id.is_none() {
            options.project_id = options.credential.project_id().map(str::to_string);
        }
        Ok(Self {
            name: name.to_string(),
            options,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &AppOptions {
        &self.options
    }

    pub fn project_id(&self) -> Option<&str> {
        self.options.project_id.as_deref()
    }
}

/// Push-notification client: the app created from the configured credential.
#[derive(Debug)]
pub struct PushClient {
    app: PushApp,
}

impl PushClient {
    pub fn new(config: &FirebaseConfig) -> Result<Self, ClientError> {
        let credential = GoogleCredential::from_file(&config.google_credential_json_path)?;
        let app = PushApp::create(AppOptions {
            credential,
            project_id: None,
        })?;
        info!(
            app = app.name(),
            project = app.project_id().unwrap_or("<none>"),
            "Initialized push app"
        );
        Ok(Self { app })
    }

    pub fn app(&self) -> &PushApp {
        &self.app
    }

    pub fn project_id(&self) -> Option<&str> {
        self.app.project_id()
    }

    /// Message-send endpoint of the app's project.
    pub fn messages_endpoint(&self) -> Option<String> {
        self.project_id()
            .map(|project| format!("{MESSAGING_API}/{project}/messages:send"))
    }
}

#[async_trait]
impl TelemetryClient for PushClient {
    async fn dispose(self) -> anyhow::Result<()> {
        debug!(app = self.app.name(), "deleted push app");
        Ok(())
    }
}
