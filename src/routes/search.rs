use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::clients::coingecko::SearchCoin;
use crate::errors::api_error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub coins: Vec<SearchCoin>,
}

/// Free-text coin search. Suppressed while the rate-limit gate is tripped;
/// a 429 from the upstream trips the gate for everyone. Results are kept in
/// a short-TTL cache so retyping the same query costs nothing upstream.
#[instrument(skip(state))]
pub async fn search_coins(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.query.trim().to_lowercase();
    if query.is_empty() {
        return Err(ApiError::InvalidQuery(
            "query must not be empty.".to_string(),
        ));
    }

    state.ensure_gate_open().await?;

    if let Some(coins) = state.search_cache.get(&query).await {
        return Ok(Json(SearchResponse { coins }));
    }

    let coins = match state.market.search(&query).await {
        Ok(coins) => coins,
        Err(err) => {
            state.observe_market_error(&err).await;
            return Err(err.into());
        }
    };
    state.search_cache.insert(query.clone(), coins.clone()).await;

    info!(query = %query, hits = coins.len(), "Coin search completed.");
    Ok(Json(SearchResponse { coins }))
}
