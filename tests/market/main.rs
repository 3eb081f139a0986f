use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use crypto_vibe_api::config::AppConfig;
use crypto_vibe_api::routes::coins::RandomCoinResponse;
use crypto_vibe_api::routes::register_routes;
use crypto_vibe_api::state::AppState;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_state(market_url: &str, tag: &str) -> AppState {
    let scratch = std::env::temp_dir();
    let watchlist_path = scratch
        .join(format!("market-{}-watchlist-{}.json", tag, std::process::id()))
        .display()
        .to_string();
    let settings_path = scratch
        .join(format!("market-{}-settings-{}.json", tag, std::process::id()))
        .display()
        .to_string();
    let _ = std::fs::remove_file(&watchlist_path);
    let _ = std::fs::remove_file(&settings_path);

    AppState::new(AppConfig {
        coingecko_base_url: market_url.to_string(),
        groq_base_url: "http://127.0.0.1:0".to_string(),
        groq_model: "test-model".to_string(),
        groq_api_key: None,
        app_server_port: 8080,
        watchlist_path,
        settings_path,
    })
}

async fn send_get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .expect("should have gotten a response")
}

#[tokio::test]
async fn trending_returns_unwrapped_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/trending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "coins": [
                { "item": { "id": "pepe", "name": "Pepe", "symbol": "PEPE", "market_cap_rank": 40 } }
            ]
        })))
        .mount(&server)
        .await;

    let app = register_routes(test_state(&server.uri(), "trending"));
    let response = send_get(app, "/market/trending").await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("should read body");
    let body: serde_json::Value = serde_json::from_slice(&bytes).expect("should parse JSON");
    assert_eq!(body["coins"][0]["id"], "pepe");
}

#[tokio::test]
async fn global_aggregates_pass_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/global"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "active_cryptocurrencies": 12000,
                "total_market_cap": { "usd": 2.5e12 },
                "total_volume": { "usd": 9.0e10 },
                "market_cap_change_percentage_24h_usd": -1.3
            }
        })))
        .mount(&server)
        .await;

    let app = register_routes(test_state(&server.uri(), "global"));
    let response = send_get(app, "/market/global").await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("should read body");
    let body: serde_json::Value = serde_json::from_slice(&bytes).expect("should parse JSON");
    assert_eq!(body["active_cryptocurrencies"], 12000);
}

#[tokio::test]
async fn top_markets_rejects_zero_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let app = register_routes(test_state(&server.uri(), "limit"));
    let response = send_get(app, "/market/top?limit=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn random_coin_picks_from_top_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "id": "bitcoin", "symbol": "btc", "name": "Bitcoin",
                "current_price": 67000.0, "market_cap": 1.3e12,
                "market_cap_rank": 1, "price_change_percentage_24h": -7.2
            }
        ])))
        .mount(&server)
        .await;

    let app = register_routes(test_state(&server.uri(), "random"));
    let response = send_get(app, "/coins/random").await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("should read body");
    let pick: RandomCoinResponse = serde_json::from_slice(&bytes).expect("should parse JSON");
    assert_eq!(pick.coin_id, "bitcoin");
}

#[tokio::test]
async fn consecutive_random_picks_share_one_listing_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "id": "bitcoin", "symbol": "btc", "name": "Bitcoin",
                "current_price": 67000.0, "market_cap": 1.3e12,
                "market_cap_rank": 1, "price_change_percentage_24h": -7.2
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let app = register_routes(test_state(&server.uri(), "listing-cache"));

    for _ in 0..2 {
        let response = send_get(app.clone(), "/coins/random").await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("should read body");
        let pick: RandomCoinResponse = serde_json::from_slice(&bytes).expect("should parse JSON");
        assert_eq!(pick.coin_id, "bitcoin");
    }
}

#[tokio::test]
async fn repeated_price_lookup_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bitcoin": { "usd": 67000.0, "usd_24h_change": -7.2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = register_routes(test_state(&server.uri(), "quote-cache"));

    for _ in 0..2 {
        let response = send_get(app.clone(), "/coins/bitcoin/price").await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("should read body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("should parse JSON");
        assert_eq!(body["priceUsd"], 67000.0);
    }
}

#[tokio::test]
async fn random_coin_falls_back_when_listing_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let app = register_routes(test_state(&server.uri(), "fallback"));
    let response = send_get(app, "/coins/random").await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("should read body");
    let pick: RandomCoinResponse = serde_json::from_slice(&bytes).expect("should parse JSON");
    assert!(!pick.coin_id.is_empty());
}
