//! Peripheral market views: trending coins, global aggregates, top-N by
//! market cap. All best-effort reads of the market-data API, gated like
//! every other outbound call.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::clients::coingecko::{GlobalData, MarketCoin, MarketError, TrendingCoin};
use crate::errors::api_error::ApiError;
use crate::state::AppState;

const DEFAULT_TOP_LIMIT: usize = 10;
const MAX_TOP_LIMIT: usize = 250;

#[derive(Debug, Serialize)]
pub struct TrendingViewResponse {
    pub coins: Vec<TrendingCoin>,
}

#[derive(Debug, Serialize)]
pub struct TopMarketsResponse {
    pub coins: Vec<MarketCoin>,
}

#[derive(Debug, Deserialize)]
pub struct TopMarketsQuery {
    pub limit: Option<usize>,
}

async fn run_market_call<T>(
    state: &AppState,
    result: Result<T, MarketError>,
) -> Result<T, ApiError> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => {
            state.observe_market_error(&err).await;
            Err(err.into())
        }
    }
}

#[instrument(skip(state))]
pub async fn get_trending(
    State(state): State<AppState>,
) -> Result<Json<TrendingViewResponse>, ApiError> {
    state.ensure_gate_open().await?;
    let coins = run_market_call(&state, state.market.trending().await).await?;
    Ok(Json(TrendingViewResponse { coins }))
}

#[instrument(skip(state))]
pub async fn get_global(State(state): State<AppState>) -> Result<Json<GlobalData>, ApiError> {
    state.ensure_gate_open().await?;
    let data = run_market_call(&state, state.market.global().await).await?;
    Ok(Json(data))
}

#[instrument(skip(state))]
pub async fn get_top_markets(
    State(state): State<AppState>,
    Query(params): Query<TopMarketsQuery>,
) -> Result<Json<TopMarketsResponse>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_TOP_LIMIT);
    if limit == 0 || limit > MAX_TOP_LIMIT {
        return Err(ApiError::InvalidQuery(format!(
            "limit must be between 1 and {MAX_TOP_LIMIT}."
        )));
    }

    state.ensure_gate_open().await?;
    let coins = run_market_call(&state, state.market.top_markets(limit).await).await?;
    Ok(Json(TopMarketsResponse { coins }))
}
