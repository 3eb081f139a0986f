//! Short-TTL memo of vibe-check results, keyed by the full input tuple so an
//! unchanged render never repeats a billed completion call. Price and change
//! are quantized (cents, basis points) to make the key hashable.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::clients::groq::VibeCheck;

const TTL_SECS: i64 = 180;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VibeKey {
    coin_id: String,
    price_cents: i64,
    change_bps: i64,
    style: String,
    language: String,
}

impl VibeKey {
    pub fn new(coin_id: &str, price_usd: f64, change_24h: f64, style: &str, language: &str) -> Self {
        Self {
            coin_id: coin_id.to_string(),
            price_cents: (price_usd * 100.0).round() as i64,
            change_bps: (change_24h * 100.0).round() as i64,
            style: style.to_string(),
            language: language.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct VibeCache {
    entries: Arc<RwLock<HashMap<VibeKey, (VibeCheck, DateTime<Utc>)>>>,
    ttl: Duration,
}

impl VibeCache {
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn get(&self, key: &VibeKey) -> Option<VibeCheck> {
        let entries = self.entries.read().await;
        let (value, cached_at) = entries.get(key)?;

        if Utc::now() - *cached_at < self.ttl {
            Some(value.clone())
        } else {
            None
        }
    }

    pub async fn insert(&self, key: VibeKey, value: VibeCheck) {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, cached_at)| now - *cached_at < self.ttl);
        entries.insert(key, (value, now));
    }
}

impl Default for VibeCache {
    fn default() -> Self {
        Self::new()
    }
}
