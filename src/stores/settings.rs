//! User settings persistence. Currently just the display language, kept in a
//! flat JSON file with the same best-effort semantics as the watchlist store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::warn;

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

#[derive(Clone)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Arc<RwLock<Settings>>,
}

impl SettingsStore {
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let settings = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(path = %path.display(), error = %err, "Settings file unreadable, using defaults.");
                Settings::default()
            }),
            Err(_) => Settings::default(),
        };

        Self {
            path,
            settings: Arc::new(RwLock::new(settings)),
        }
    }

    pub async fn current(&self) -> Settings {
        self.settings.read().await.clone()
    }

    pub async fn set_language(&self, language: &str) {
        let mut settings = self.settings.write().await;
        settings.language = language.to_string();
        persist(&self.path, &settings);
    }
}

fn persist(path: &Path, settings: &Settings) {
    let raw = match serde_json::to_string(settings) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(error = %err, "Failed to serialize settings.");
            return;
        }
    };

    if let Err(err) = std::fs::write(path, raw) {
        warn!(path = %path.display(), error = %err, "Failed to persist settings.");
    }
}
