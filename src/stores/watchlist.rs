//! Watchlist persistence: a flat JSON mapping of coin id to entry, written
//! back on every mutation. Reads that fail degrade to an empty watchlist;
//! writes are best-effort and a failure is logged and ignored. Single-writer
//! model: concurrent external writers to the backing file are not supported.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::warn;

pub const MIN_THRESHOLD: f64 = 1.0;
pub const MAX_THRESHOLD: f64 = 50.0;
pub const DEFAULT_THRESHOLD: f64 = 10.0;

/// One watched coin. `threshold` is the absolute 24h-change percentage that
/// triggers an alert, always within `[1, 50]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub name: String,
    pub symbol: String,
    pub threshold: f64,
}

#[derive(Clone)]
pub struct WatchlistStore {
    path: PathBuf,
    entries: Arc<RwLock<HashMap<String, WatchlistEntry>>>,
}

impl WatchlistStore {
    /// Load the watchlist from `path`. A missing or unreadable file means
    /// "no prior state", never an error.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = read_mapping(&path);

        Self {
            path,
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    pub async fn snapshot(&self) -> HashMap<String, WatchlistEntry> {
        self.entries.read().await.clone()
    }

    pub async fn coin_ids(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }

    pub async fn contains(&self, coin_id: &str) -> bool {
        self.entries.read().await.contains_key(coin_id)
    }

    pub async fn add(&self, coin_id: &str, name: &str, symbol: &str, threshold: f64) {
        let entry = WatchlistEntry {
            name: name.to_string(),
            symbol: symbol.to_string(),
            threshold: threshold.clamp(MIN_THRESHOLD, MAX_THRESHOLD),
        };

        let mut entries = self.entries.write().await;
        entries.insert(coin_id.to_string(), entry);
        persist(&self.path, &entries);
    }

    /// Returns false when the coin was not watched.
    pub async fn remove(&self, coin_id: &str) -> bool {
        let mut entries = self.entries.write().await;
        let removed = entries.remove(coin_id).is_some();
        if removed {
            persist(&self.path, &entries);
        }
        removed
    }

    /// Returns false when the coin was not watched.
    pub async fn set_threshold(&self, coin_id: &str, threshold: f64) -> bool {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(coin_id) else {
            return false;
        };

        entry.threshold = threshold.clamp(MIN_THRESHOLD, MAX_THRESHOLD);
        persist(&self.path, &entries);
        true
    }
}

fn read_mapping(path: &Path) -> HashMap<String, WatchlistEntry> {
    match std::fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "Watchlist file unreadable, starting empty.");
            HashMap::new()
        }),
        Err(_) => HashMap::new(),
    }
}

fn persist(path: &Path, entries: &HashMap<String, WatchlistEntry>) {
    let raw = match serde_json::to_string(entries) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(error = %err, "Failed to serialize watchlist.");
            return;
        }
    };

    if let Err(err) = std::fs::write(path, raw) {
        warn!(path = %path.display(), error = %err, "Failed to persist watchlist.");
    }
}
