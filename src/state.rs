use std::sync::Arc;

use chrono::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::alerts::AlertEvaluator;
use crate::cache::price_cache::PriceCache;
use crate::cache::ttl_cache::TtlCache;
use crate::cache::vibe_cache::VibeCache;
use crate::clients::coingecko::{CoinGeckoClient, MarketError, SearchCoin, SimplePrice};
use crate::clients::groq::VibeClient;
use crate::config::AppConfig;
use crate::errors::api_error::ApiError;
use crate::rate_limit::RateLimitGate;
use crate::stores::settings::SettingsStore;
use crate::stores::watchlist::WatchlistStore;

const SEARCH_TTL_SECS: i64 = 600;
const QUOTE_TTL_SECS: i64 = 120;
const LISTING_TTL_SECS: i64 = 3600;

/// Everything a handler needs: config, upstream clients, the persisted
/// stores, the in-memory caches, and the shared alert / rate-limit state.
/// Cheap to clone; mutable pieces sit behind `Arc<RwLock<...>>`.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub market: CoinGeckoClient,
    pub vibe: VibeClient,
    pub watchlist: WatchlistStore,
    pub settings: SettingsStore,
    pub price_cache: PriceCache,
    pub vibe_cache: VibeCache,
    /// Search results by query, 10 minutes.
    pub search_cache: TtlCache<String, Vec<SearchCoin>>,
    /// Single-coin quotes, same freshness window as the watchlist batch.
    pub quote_cache: TtlCache<String, SimplePrice>,
    /// Top-coins id listing by requested size, 1 hour.
    pub listing_cache: TtlCache<usize, Vec<String>>,
    pub alerts: Arc<RwLock<AlertEvaluator>>,
    pub gate: Arc<RwLock<RateLimitGate>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let market = CoinGeckoClient::new(&config.coingecko_base_url);
        let vibe = VibeClient::new(
            &config.groq_base_url,
            &config.groq_model,
            config.groq_api_key.clone(),
        );
        let watchlist = WatchlistStore::load(&config.watchlist_path);
        let settings = SettingsStore::load(&config.settings_path);

        Self {
            config,
            market,
            vibe,
            watchlist,
            settings,
            price_cache: PriceCache::new(),
            vibe_cache: VibeCache::new(),
            search_cache: TtlCache::new(Duration::seconds(SEARCH_TTL_SECS)),
            quote_cache: TtlCache::new(Duration::seconds(QUOTE_TTL_SECS)),
            listing_cache: TtlCache::new(Duration::seconds(LISTING_TTL_SECS)),
            alerts: Arc::new(RwLock::new(AlertEvaluator::new())),
            gate: Arc::new(RwLock::new(RateLimitGate::new())),
        }
    }

    /// If the gate is tripped and a probe is due, ping the market-data API
    /// and reopen on success. Returns whether the gate is open afterwards.
    pub async fn probe_gate_if_due(&self) -> bool {
        let admitted = self.gate.write().await.try_begin_probe();

        if admitted {
            let available = self.market.ping().await;
            self.gate.write().await.record_probe_result(available);
            if available {
                info!("Market-data API available again, rate-limit gate reopened.");
            } else {
                warn!("Availability probe failed, rate-limit gate stays tripped.");
            }
        }

        !self.gate.read().await.is_tripped()
    }

    /// Gate check for search / price-lookup / vibe handlers. A tripped gate
    /// gets one probe attempt (interval permitting) before the request is
    /// rejected.
    pub async fn ensure_gate_open(&self) -> Result<(), ApiError> {
        if !self.gate.read().await.is_tripped() {
            return Ok(());
        }

        if self.probe_gate_if_due().await {
            Ok(())
        } else {
            Err(ApiError::RateLimited)
        }
    }

    /// Trips the gate on a rate-limit response, whichever endpoint saw it.
    pub async fn observe_market_error(&self, err: &MarketError) {
        if matches!(err, MarketError::RateLimited) {
            warn!("Upstream rate limit hit, tripping the gate.");
            self.gate.write().await.trip();
        }
    }
}
