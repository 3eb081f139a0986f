//! Watchlist mutations. Every change persists immediately and invalidates
//! the price cache so the next dashboard pass reflects it.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::errors::api_error::ApiError;
use crate::state::AppState;
use crate::stores::watchlist::{DEFAULT_THRESHOLD, MAX_THRESHOLD, MIN_THRESHOLD};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistRow {
    pub coin_id: String,
    pub name: String,
    pub symbol: String,
    pub threshold: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WatchlistResponse {
    pub coins: Vec<WatchlistRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWatchRequest {
    pub coin_id: String,
    pub name: String,
    pub symbol: String,
    pub threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SetThresholdRequest {
    pub threshold: f64,
}

async fn watchlist_rows(state: &AppState) -> Vec<WatchlistRow> {
    let mut rows: Vec<WatchlistRow> = state
        .watchlist
        .snapshot()
        .await
        .into_iter()
        .map(|(coin_id, entry)| WatchlistRow {
            coin_id,
            name: entry.name,
            symbol: entry.symbol,
            threshold: entry.threshold,
        })
        .collect();
    rows.sort_by(|a, b| a.coin_id.cmp(&b.coin_id));
    rows
}

fn validate_threshold(threshold: f64) -> Result<(), ApiError> {
    if !(MIN_THRESHOLD..=MAX_THRESHOLD).contains(&threshold) {
        return Err(ApiError::InvalidQuery(format!(
            "threshold must be between {MIN_THRESHOLD} and {MAX_THRESHOLD}."
        )));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn get_watchlist(State(state): State<AppState>) -> Json<WatchlistResponse> {
    Json(WatchlistResponse {
        coins: watchlist_rows(&state).await,
    })
}

#[instrument(skip(state, request), fields(coin_id = %request.coin_id))]
pub async fn add_watch(
    State(state): State<AppState>,
    Json(request): Json<AddWatchRequest>,
) -> Result<Json<WatchlistResponse>, ApiError> {
    let coin_id = request.coin_id.trim();
    if coin_id.is_empty() {
        return Err(ApiError::InvalidQuery("coinId must not be empty.".to_string()));
    }

    let threshold = request.threshold.unwrap_or(DEFAULT_THRESHOLD);
    validate_threshold(threshold)?;

    state
        .watchlist
        .add(coin_id, &request.name, &request.symbol, threshold)
        .await;
    state.price_cache.invalidate().await;

    info!(coin_id = %coin_id, threshold, "Coin added to watchlist.");
    Ok(Json(WatchlistResponse {
        coins: watchlist_rows(&state).await,
    }))
}

#[instrument(skip(state))]
pub async fn remove_watch(
    State(state): State<AppState>,
    Path(coin_id): Path<String>,
) -> Result<Json<WatchlistResponse>, ApiError> {
    if !state.watchlist.remove(&coin_id).await {
        return Err(ApiError::NotFound(format!("'{coin_id}' is not watched.")));
    }
    state.price_cache.invalidate().await;

    info!(coin_id = %coin_id, "Coin removed from watchlist.");
    Ok(Json(WatchlistResponse {
        coins: watchlist_rows(&state).await,
    }))
}

#[instrument(skip(state, request))]
pub async fn set_threshold(
    State(state): State<AppState>,
    Path(coin_id): Path<String>,
    Json(request): Json<SetThresholdRequest>,
) -> Result<Json<WatchlistResponse>, ApiError> {
    validate_threshold(request.threshold)?;

    if !state.watchlist.set_threshold(&coin_id, request.threshold).await {
        return Err(ApiError::NotFound(format!("'{coin_id}' is not watched.")));
    }

    info!(coin_id = %coin_id, threshold = request.threshold, "Alert threshold updated.");
    Ok(Json(WatchlistResponse {
        coins: watchlist_rows(&state).await,
    }))
}
