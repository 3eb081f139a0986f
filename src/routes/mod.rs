use axum::{
    routing::{delete, get, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use coins::{get_coin_history, get_coin_price, get_coin_vibe, random_coin};
use dashboard::get_dashboard;
use health_check::health_check;
use market::{get_global, get_top_markets, get_trending};
use search::search_coins;
use settings::{get_settings, put_settings};
use watchlist::{add_watch, get_watchlist, remove_watch, set_threshold};

pub mod coins;
pub mod dashboard;
pub mod health_check;
pub mod market;
pub mod search;
pub mod settings;
pub mod watchlist;

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/health_check", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/search", get(search_coins))
        .route("/coins/random", get(random_coin))
        .route("/coins/{coin_id}/price", get(get_coin_price))
        .route("/coins/{coin_id}/vibe", get(get_coin_vibe))
        .route("/coins/{coin_id}/history", get(get_coin_history))
        .route("/market/trending", get(get_trending))
        .route("/market/global", get(get_global))
        .route("/market/top", get(get_top_markets))
        .route("/watchlist", get(get_watchlist).post(add_watch))
        .route("/watchlist/{coin_id}", delete(remove_watch))
        .route("/watchlist/{coin_id}/threshold", put(set_threshold))
        .route("/settings", get(get_settings).put(put_settings))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
