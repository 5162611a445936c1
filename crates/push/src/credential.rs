//! Google credential files as downloaded from the cloud console.

use std::fmt;
use std::fs;
use std::path::Path;

use hostlink_integration::ClientError;
use serde::Deserialize;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default)]
    pub quota_project_id: Option<String>,
}

/// Parsed credential file, keyed on its `type` field.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GoogleCredential {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUser),
}

impl GoogleCredential {
    pub fn from_file(path: &Path) -> Result<Self, ClientError> {
        let raw = fs::read_to_string(path).map_err(|source| ClientError::Credential {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|reason| ClientError::InvalidCredential {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, String> {
        let credential: Self = serde_json::from_str(raw).map_err(|err| err.to_string())?;
        credential.validate()?;
        Ok(credential)
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            Self::ServiceAccount(key) => {
                if key.project_id.trim().is_empty() {
                    return Err("project_id is empty".to_string());
                }
                if key.client_email.trim().is_empty() {
                    return Err("client_email is empty".to_string());
                }
                if !key.private_key.contains("PRIVATE KEY") {
                    return Err("private_key is not a PEM private key".to_string());
                }
            }
            Self::AuthorizedUser(user) => {
                if user.refresh_token.trim().is_empty() {
                    return Err("refresh_token is empty".to_string());
                }
            }
        }
        Ok(())
    }

    /// Project the credential is bound to, if it names one.
    pub fn project_id(&self) -> Option<&str> {
        match self {
            Self::ServiceAccount(key) => Some(&key.project_id),
            Self::AuthorizedUser(user) => user.quota_project_id.as_deref(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServiceAccount(_) => "service_account",
            Self::AuthorizedUser(_) => "authorized_user",
        }
    }
}

impl fmt::Debug for GoogleCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServiceAccount(key) => f
                .debug_struct("ServiceAccount")
                .field("project_id", &key.project_id)
                .field("client_email", &key.client_email)
                .field("private_key_id", &key.private_key_id)
                .field("private_key", &"<redacted>")
                .finish(),
            Self::AuthorizedUser(user) => f
                .debug_struct("AuthorizedUser")
                .field("client_id", &user.client_id)
                .field("client_secret", &"<redacted>")
                .field("refresh_token", &"<redacted>")
                .finish(),
        }
    }
}
