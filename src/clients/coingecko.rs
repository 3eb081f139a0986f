//! # CoinGecko Client
//!
//! Thin client over the CoinGecko v3 REST API. Every call is a GET returning
//! JSON; responses are best-effort and callers decide whether a failure
//! degrades to stale data or surfaces as an API error.
//!
//! A 429 from any endpoint is mapped to [`MarketError::RateLimited`] so the
//! caller can trip the process-wide rate-limit gate.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("rate limited by market-data API")]
    RateLimited,
    #[error("market-data API returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("market-data request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

//
// ----------- Response Models -----------
//

/// One entry of the `/simple/price` batch response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimplePrice {
    pub usd: f64,
    pub usd_24h_change: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub coins: Vec<SearchCoin>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub market_cap_rank: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TrendingResponse {
    pub coins: Vec<TrendingEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TrendingEntry {
    pub item: TrendingCoin,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrendingCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub market_cap_rank: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalData,
}

/// Market-wide aggregates from `/global`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalData {
    pub active_cryptocurrencies: Option<u64>,
    pub total_market_cap: HashMap<String, f64>,
    pub total_volume: HashMap<String, f64>,
    pub market_cap_change_percentage_24h_usd: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub market_cap_rank: Option<u32>,
    pub price_change_percentage_24h: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<[f64; 2]>,
}

/// One day-bucketed point of a coin's price history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

//
// ----------- Client -----------
//

#[derive(Clone)]
pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client construction should not fail");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, MarketError> {
        debug!(url = %url, "Requesting market data.");
        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if status.as_u16() == 429 {
            return Err(MarketError::RateLimited);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MarketError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }

    /// Batched price + 24h-change lookup for a list of coin ids.
    pub async fn simple_price(
        &self,
        coin_ids: &[String],
    ) -> Result<HashMap<String, SimplePrice>, MarketError> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd&include_24hr_change=true",
            self.base_url,
            coin_ids.join(",")
        );
        self.get_json(url).await
    }

    /// Free-text coin search. The first hit is what the dashboard displays.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchCoin>, MarketError> {
        let url = format!("{}/search?query={}", self.base_url, query);
        let response: SearchResponse = self.get_json(url).await?;
        Ok(response.coins)
    }

    pub async fn trending(&self) -> Result<Vec<TrendingCoin>, MarketError> {
        let url = format!("{}/search/trending", self.base_url);
        let response: TrendingResponse = self.get_json(url).await?;
        Ok(response.coins.into_iter().map(|entry| entry.item).collect())
    }

    pub async fn global(&self) -> Result<GlobalData, MarketError> {
        let url = format!("{}/global", self.base_url);
        let response: GlobalResponse = self.get_json(url).await?;
        Ok(response.data)
    }

    /// Top coins by market cap, one page.
    pub async fn top_markets(&self, limit: usize) -> Result<Vec<MarketCoin>, MarketError> {
        let url = format!(
            "{}/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={}&page=1",
            self.base_url, limit
        );
        self.get_json(url).await
    }

    /// Day-bucketed price series over the trailing `days` days.
    pub async fn market_chart(
        &self,
        coin_id: &str,
        days: u32,
    ) -> Result<Vec<HistoryPoint>, MarketError> {
        let url = format!(
            "{}/coins/{}/market_chart?vs_currency=usd&days={}&interval=daily",
            self.base_url, coin_id, days
        );
        let response: MarketChartResponse = self.get_json(url).await?;

        let points = response
            .prices
            .into_iter()
            .filter_map(|[timestamp_ms, price]| {
                Utc.timestamp_millis_opt(timestamp_ms as i64)
                    .single()
                    .map(|timestamp| HistoryPoint { timestamp, price })
            })
            .collect();

        Ok(points)
    }

    /// Availability probe used to reopen the rate-limit gate. Short timeout,
    /// any failure counts as "still unavailable".
    pub async fn ping(&self) -> bool {
        let url = format!("{}/ping", self.base_url);
        match self.http.get(&url).timeout(PROBE_TIMEOUT).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
