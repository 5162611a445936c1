//! Push-notification integration.
//!
//! Attaching reads the Google credential file named in `firebase.yaml` and
//! creates the default [`PushApp`] from it. Message delivery itself is left to
//! whatever consumes the app.

pub mod backend;
pub mod client;
pub mod config;
pub mod credential;

pub use backend::{PushBackend, PushManager, BACKEND_NAME};
pub use client::{AppOptions, PushApp, PushClient, DEFAULT_APP_NAME};
pub use config::{FirebaseConfig, CONFIG_FILE, DEFAULT_CREDENTIAL_PATH};
pub use credential::{AuthorizedUser, GoogleCredential, ServiceAccountKey};
