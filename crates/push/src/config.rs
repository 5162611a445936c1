use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "firebase.yaml";
pub const DEFAULT_CREDENTIAL_PATH: &str = "GoogleCredential.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirebaseConfig {
    /// Path to the Google credential JSON file. A relative path is taken
    /// from the directory holding `firebase.yaml`.
    pub google_credential_json_path: PathBuf,
}

impl FirebaseConfig {
    /// Anchor a relative credential path at `root`.
    pub fn resolved_against(mut self, root: &Path) -> Self {
        if self.google_credential_json_path.is_relative() {
            self.google_credential_json_path = root.join(&self.google_credential_json_path);
        }
        self
    }
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            google_credential_json_path: PathBuf::from(DEFAULT_CREDENTIAL_PATH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_is_anchored() {
        let config = FirebaseConfig::default().resolved_against(Path::new("/srv/host"));
        assert_eq!(
            config.google_credential_json_path,
            PathBuf::from("/srv/host/GoogleCredential.json")
        );
    }

    #[test]
    fn test_absolute_path_is_kept() {
        let config = FirebaseConfig {
            google_credential_json_path: PathBuf::from("/etc/hostlink/cred.json"),
        }
        .resolved_against(Path::new("/srv/host"));
        assert_eq!(
            config.google_credential_json_path,
            PathBuf::from("/etc/hostlink/cred.json")
        );
    }
}
