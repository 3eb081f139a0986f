//! The dashboard "render pass": one endpoint that probes the rate-limit
//! gate, refreshes the watchlist price cache, evaluates alerts (firing and
//! acknowledging in the same pass), and returns the state a front end needs
//! to paint the page.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::alerts::is_alerting;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedCoinView {
    pub coin_id: String,
    pub name: String,
    pub symbol: String,
    pub threshold: f64,
    pub price_usd: Option<f64>,
    pub change_24h: Option<f64>,
    pub alerting: bool,
    pub prices_as_of: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub coins: Vec<WatchedCoinView>,
    /// Coins that breached their threshold on this pass and had not been
    /// acknowledged before it. One popup each, then quiet until recovery.
    pub new_alerts: Vec<String>,
    pub has_new_alert: bool,
    pub rate_limited: bool,
    pub rate_limited_since: Option<DateTime<Utc>>,
}

#[instrument(skip(state))]
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    state.probe_gate_if_due().await;

    let coin_ids = state.watchlist.coin_ids().await;
    let refresh = state.price_cache.get_or_refresh(&state.market, &coin_ids).await;
    if let Some(err) = &refresh.refresh_error {
        state.observe_market_error(err).await;
    }

    let watchlist = state.watchlist.snapshot().await;
    let pass = state
        .alerts
        .write()
        .await
        .evaluate(&watchlist, &refresh.quotes);

    let mut coins: Vec<WatchedCoinView> = watchlist
        .into_iter()
        .map(|(coin_id, entry)| {
            let quote = refresh.quotes.get(&coin_id);
            WatchedCoinView {
                alerting: quote
                    .is_some_and(|quote| is_alerting(quote.change_24h, entry.threshold)),
                price_usd: quote.map(|quote| quote.price_usd),
                change_24h: quote.and_then(|quote| quote.change_24h),
                prices_as_of: quote.map(|quote| quote.fetched_at),
                coin_id,
                name: entry.name,
                symbol: entry.symbol,
                threshold: entry.threshold,
            }
        })
        .collect();
    coins.sort_by(|a, b| a.coin_id.cmp(&b.coin_id));

    let gate = state.gate.read().await;

    Json(DashboardResponse {
        coins,
        has_new_alert: pass.has_new_alert(),
        new_alerts: pass.new_alerts,
        rate_limited: gate.is_tripped(),
        rate_limited_since: gate.tripped_at(),
    })
}
