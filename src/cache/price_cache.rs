//! Short-TTL cache for the watchlist's batched price lookups.
//!
//! Policy: a batch younger than the freshness window is returned unchanged
//! with no network call. A refresh failure other than a rate limit returns
//! the stale batch instead of failing the caller; a rate limit is reported
//! alongside the stale batch so the caller can trip the gate. The cache
//! itself never retries.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::clients::coingecko::{CoinGeckoClient, MarketError, SimplePrice};

const FRESHNESS_WINDOW_SECS: i64 = 120;

/// Quote for one watched coin at a point in time. Recreated on every
/// refresh, never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
    pub price_usd: f64,
    pub change_24h: Option<f64>,
    pub fetched_at: DateTime<Utc>,
}

/// Outcome of one cache pass: the best quotes available plus the refresh
/// error, if the pass tried and failed to refresh.
#[derive(Debug)]
pub struct PriceRefresh {
    pub quotes: HashMap<String, PriceSnapshot>,
    pub refresh_error: Option<MarketError>,
}

#[derive(Default)]
struct CacheSlot {
    quotes: HashMap<String, SimplePrice>,
    fetched_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct PriceCache {
    slot: Arc<RwLock<CacheSlot>>,
    freshness_window: Duration,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::with_freshness_window(Duration::seconds(FRESHNESS_WINDOW_SECS))
    }

    pub fn with_freshness_window(freshness_window: Duration) -> Self {
        Self {
            slot: Arc::new(RwLock::new(CacheSlot::default())),
            freshness_window,
        }
    }

    /// Drop the cached batch so the next pass refetches. Called when the
    /// watchlist changes, so a newly watched coin shows up immediately.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.write().await;
        slot.fetched_at = None;
    }

    pub async fn get_or_refresh(
        &self,
        market: &CoinGeckoClient,
        coin_ids: &[String],
    ) -> PriceRefresh {
        if coin_ids.is_empty() {
            return PriceRefresh {
                quotes: HashMap::new(),
                refresh_error: None,
            };
        }

        {
            let slot = self.slot.read().await;
            if let Some(fetched_at) = slot.fetched_at {
                if Utc::now() - fetched_at < self.freshness_window {
                    return PriceRefresh {
                        quotes: snapshots(&slot.quotes, fetched_at),
                        refresh_error: None,
                    };
                }
            }
        }

        match market.simple_price(coin_ids).await {
            Ok(quotes) => {
                let fetched_at = Utc::now();
                let mut slot = self.slot.write().await;
                slot.quotes = quotes;
                slot.fetched_at = Some(fetched_at);

                info!(coins = coin_ids.len(), "Refreshed watchlist prices.");
                PriceRefresh {
                    quotes: snapshots(&slot.quotes, fetched_at),
                    refresh_error: None,
                }
            }
            Err(err) => {
                warn!(error = %err, "Price refresh failed, serving stale batch.");
                let slot = self.slot.read().await;
                let quotes = slot
                    .fetched_at
                    .map(|fetched_at| snapshots(&slot.quotes, fetched_at))
                    .unwrap_or_default();

                PriceRefresh {
                    quotes,
                    refresh_error: Some(err),
                }
            }
        }
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new()
    }
}

fn snapshots(
    quotes: &HashMap<String, SimplePrice>,
    fetched_at: DateTime<Utc>,
) -> HashMap<String, PriceSnapshot> {
    quotes
        .iter()
        .map(|(coin_id, quote)| {
            (
                coin_id.clone(),
                PriceSnapshot {
                    price_usd: quote.usd,
                    change_24h: quote.usd_24h_change,
                    fetched_at,
                },
            )
        })
        .collect()
}
