//! Generic short-TTL memo: explicit (key, value, expiry) entries behind a
//! get/insert contract, used wherever a market-data view is worth keeping
//! for a while (free-text search, single-coin quotes, the top-coins
//! listing). Expired entries are pruned on insert.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct TtlCache<K, V> {
    entries: Arc<RwLock<HashMap<K, (V, DateTime<Utc>)>>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        let (value, cached_at) = entries.get(key)?;

        if Utc::now() - *cached_at < self.ttl {
            Some(value.clone())
        } else {
            None
        }
    }

    pub async fn insert(&self, key: K, value: V) {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, cached_at)| now - *cached_at < self.ttl);
        entries.insert(key, (value, now));
    }
}
