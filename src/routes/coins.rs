use axum::{
    extract::{Path, Query, State},
    Json,
};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::cache::vibe_cache::VibeKey;
use crate::clients::coingecko::HistoryPoint;
use crate::errors::api_error::ApiError;
use crate::state::AppState;

/// Shown when the top-coins listing is unavailable; the random picker still
/// has to return something.
const FALLBACK_COINS: [&str; 7] = [
    "bitcoin",
    "ethereum",
    "solana",
    "dogecoin",
    "cardano",
    "ripple",
    "litecoin",
];

const DEFAULT_STYLE: &str = "A Surfer Dude";
const DEFAULT_HISTORY_DAYS: u32 = 7;
const MAX_HISTORY_DAYS: u32 = 365;
const TOP_LISTING_SIZE: usize = 50;

//
// ----------- Price -----------
//

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinPriceResponse {
    pub coin_id: String,
    pub price_usd: f64,
    pub change_24h: Option<f64>,
}

#[instrument(skip(state))]
pub async fn get_coin_price(
    State(state): State<AppState>,
    Path(coin_id): Path<String>,
) -> Result<Json<CoinPriceResponse>, ApiError> {
    state.ensure_gate_open().await?;

    let quote = fetch_single_price(&state, &coin_id).await?;
    Ok(Json(quote))
}

/// Single-coin quote with a short-TTL cache in front, so a lookup followed
/// by a vibe check costs one upstream call, not two.
async fn fetch_single_price(
    state: &AppState,
    coin_id: &str,
) -> Result<CoinPriceResponse, ApiError> {
    let cache_key = coin_id.to_string();
    let quote = match state.quote_cache.get(&cache_key).await {
        Some(cached) => cached,
        None => {
            let ids = vec![coin_id.to_string()];
            let mut quotes = match state.market.simple_price(&ids).await {
                Ok(quotes) => quotes,
                Err(err) => {
                    state.observe_market_error(&err).await;
                    return Err(err.into());
                }
            };

            let quote = quotes
                .remove(coin_id)
                .ok_or_else(|| ApiError::NotFound(format!("No price data for '{coin_id}'.")))?;
            state.quote_cache.insert(cache_key, quote.clone()).await;
            quote
        }
    };

    Ok(CoinPriceResponse {
        coin_id: coin_id.to_string(),
        price_usd: quote.usd,
        change_24h: quote.usd_24h_change,
    })
}

//
// ----------- Vibe Check -----------
//

#[derive(Debug, Deserialize)]
pub struct VibeQuery {
    pub style: Option<String>,
    /// Display name for the prompt; falls back to the coin id.
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VibeResponse {
    pub coin_id: String,
    pub style: String,
    pub rating: u8,
    pub message: String,
    pub price_usd: f64,
    pub change_24h: Option<f64>,
}

/// One stylized commentary per (coin, price, change, style, language) tuple,
/// served from the short-TTL cache when the render has not changed.
#[instrument(skip(state))]
pub async fn get_coin_vibe(
    State(state): State<AppState>,
    Path(coin_id): Path<String>,
    Query(params): Query<VibeQuery>,
) -> Result<Json<VibeResponse>, ApiError> {
    if !state.vibe.has_api_key() {
        return Err(ApiError::MissingApiKey);
    }

    state.ensure_gate_open().await?;

    let style = params.style.unwrap_or_else(|| DEFAULT_STYLE.to_string());
    let coin_name = params.name.unwrap_or_else(|| coin_id.clone());
    let language = state.settings.current().await.language;

    let quote = fetch_single_price(&state, &coin_id).await?;
    let change_24h = quote.change_24h.unwrap_or(0.0);

    let key = VibeKey::new(&coin_id, quote.price_usd, change_24h, &style, &language);
    let vibe = match state.vibe_cache.get(&key).await {
        Some(cached) => cached,
        None => {
            let fresh = state
                .vibe
                .vibe_check(&coin_name, quote.price_usd, change_24h, &style, &language)
                .await?;
            state.vibe_cache.insert(key, fresh.clone()).await;
            fresh
        }
    };

    info!(coin_id = %coin_id, rating = vibe.rating, "Vibe check served.");
    Ok(Json(VibeResponse {
        coin_id,
        style,
        rating: vibe.rating,
        message: vibe.message,
        price_usd: quote.price_usd,
        change_24h: quote.change_24h,
    }))
}

//
// ----------- History -----------
//

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub coin_id: String,
    pub days: u32,
    pub points: Vec<HistoryPoint>,
}

#[instrument(skip(state))]
pub async fn get_coin_history(
    State(state): State<AppState>,
    Path(coin_id): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let days = params.days.unwrap_or(DEFAULT_HISTORY_DAYS);
    if days == 0 || days > MAX_HISTORY_DAYS {
        return Err(ApiError::InvalidQuery(format!(
            "days must be between 1 and {MAX_HISTORY_DAYS}."
        )));
    }

    state.ensure_gate_open().await?;

    let points = match state.market.market_chart(&coin_id, days).await {
        Ok(points) => points,
        Err(err) => {
            state.observe_market_error(&err).await;
            return Err(err.into());
        }
    };

    Ok(Json(HistoryResponse {
        coin_id,
        days,
        points,
    }))
}

//
// ----------- Random Pick -----------
//

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomCoinResponse {
    pub coin_id: String,
}

/// Random coin id from the top-50 market-cap listing, falling back to a
/// fixed shortlist when the listing is unavailable. The listing is held in
/// an hour-long cache; only a cache miss goes upstream. Never fails the
/// caller.
#[instrument(skip(state))]
pub async fn random_coin(State(state): State<AppState>) -> Json<RandomCoinResponse> {
    let candidates = match state.listing_cache.get(&TOP_LISTING_SIZE).await {
        Some(ids) => ids,
        None if state.gate.read().await.is_tripped() => Vec::new(),
        None => match state.market.top_markets(TOP_LISTING_SIZE).await {
            Ok(coins) => {
                let ids: Vec<String> = coins
                    .into_iter()
                    .filter(|coin| coin.market_cap.is_some())
                    .map(|coin| coin.id)
                    .collect();
                state.listing_cache.insert(TOP_LISTING_SIZE, ids.clone()).await;
                ids
            }
            Err(err) => {
                state.observe_market_error(&err).await;
                warn!(error = %err, "Top-coins listing unavailable, using fallback list.");
                Vec::new()
            }
        },
    };

    let coin_id = candidates
        .choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_else(|| {
            FALLBACK_COINS
                .choose(&mut rand::thread_rng())
                .map(|id| id.to_string())
                .unwrap_or_else(|| "bitcoin".to_string())
        });

    Json(RandomCoinResponse { coin_id })
}
