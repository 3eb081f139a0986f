use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use crypto_vibe_api::config::AppConfig;
use crypto_vibe_api::routes::dashboard::DashboardResponse;
use crypto_vibe_api::routes::register_routes;
use crypto_vibe_api::state::AppState;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

//
// ----------- Test Helpers -----------
//

fn test_state(market_url: &str, tag: &str) -> AppState {
    let scratch = std::env::temp_dir();
    let watchlist_path = scratch
        .join(format!("dashboard-{}-watchlist-{}.json", tag, std::process::id()))
        .display()
        .to_string();
    let settings_path = scratch
        .join(format!("dashboard-{}-settings-{}.json", tag, std::process::id()))
        .display()
        .to_string();
    let _ = std::fs::remove_file(&watchlist_path);
    let _ = std::fs::remove_file(&settings_path);

    let config = AppConfig {
        coingecko_base_url: market_url.to_string(),
        groq_base_url: "http://127.0.0.1:0".to_string(),
        groq_model: "test-model".to_string(),
        groq_api_key: None,
        app_server_port: 8080,
        watchlist_path,
        settings_path,
    };

    AppState::new(config)
}

async fn get_dashboard(app: Router) -> (StatusCode, DashboardResponse) {
    let response = app
        .oneshot(
            Request::builder()
                .uri("/dashboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("should have gotten a response");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("should read body");
    let dashboard: DashboardResponse =
        serde_json::from_slice(&bytes).expect("should parse dashboard JSON");

    (status, dashboard)
}

//
// ----------- Happy Path Tests -----------
//

#[tokio::test]
async fn empty_watchlist_renders_without_any_market_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let state = test_state(&server.uri(), "empty");
    let (status, dashboard) = get_dashboard(register_routes(state)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(dashboard.coins.is_empty());
    assert!(!dashboard.has_new_alert);
    assert!(!dashboard.rate_limited);
}

#[tokio::test]
async fn breached_threshold_fires_once_and_caches_prices() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bitcoin": { "usd": 67000.0, "usd_24h_change": -7.2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = test_state(&server.uri(), "breach");
    state.watchlist.add("bitcoin", "Bitcoin", "BTC", 5.0).await;
    let app = register_routes(state);

    let (status, first) = get_dashboard(app.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first.coins.len(), 1);
    assert_eq!(first.coins[0].coin_id, "bitcoin");
    assert_eq!(first.coins[0].price_usd, Some(67000.0));
    assert!(first.coins[0].alerting);
    assert_eq!(first.new_alerts, vec!["bitcoin"]);
    assert!(first.has_new_alert);

    // Same data, immediate re-render: no refetch, no re-notification.
    let (_, second) = get_dashboard(app).await;
    assert!(second.coins[0].alerting);
    assert!(!second.has_new_alert);
    assert!(second.new_alerts.is_empty());
}

#[tokio::test]
async fn quiet_coin_below_threshold_does_not_alert() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bitcoin": { "usd": 67000.0, "usd_24h_change": 2.0 }
        })))
        .mount(&server)
        .await;

    let state = test_state(&server.uri(), "quiet");
    state.watchlist.add("bitcoin", "Bitcoin", "BTC", 10.0).await;

    let (_, dashboard) = get_dashboard(register_routes(state)).await;
    assert!(!dashboard.coins[0].alerting);
    assert!(!dashboard.has_new_alert);
}

//
// ----------- Sad Path Tests -----------
//

#[tokio::test]
async fn upstream_failure_degrades_to_render_without_prices() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let state = test_state(&server.uri(), "degrade");
    state.watchlist.add("bitcoin", "Bitcoin", "BTC", 5.0).await;

    let (status, dashboard) = get_dashboard(register_routes(state)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard.coins.len(), 1);
    assert_eq!(dashboard.coins[0].price_usd, None);
    assert!(!dashboard.coins[0].alerting);
    assert!(!dashboard.rate_limited, "a plain 500 must not trip the gate");
}

#[tokio::test]
async fn rate_limited_refresh_trips_the_gate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let state = test_state(&server.uri(), "tripped");
    state.watchlist.add("bitcoin", "Bitcoin", "BTC", 5.0).await;

    let (status, dashboard) = get_dashboard(register_routes(state)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(dashboard.rate_limited);
    assert!(dashboard.rate_limited_since.is_some());
}
