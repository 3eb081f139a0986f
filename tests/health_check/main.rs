use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use crypto_vibe_api::config::AppConfig;
use crypto_vibe_api::routes::{health_check::HealthCheckResponse, register_routes};
use crypto_vibe_api::state::AppState;
use tower::ServiceExt;

fn test_config() -> AppConfig {
    let scratch = std::env::temp_dir();
    AppConfig {
        coingecko_base_url: "http://127.0.0.1:0".to_string(),
        groq_base_url: "http://127.0.0.1:0".to_string(),
        groq_model: "test-model".to_string(),
        groq_api_key: None,
        app_server_port: 8080,
        watchlist_path: scratch
            .join(format!("health-watchlist-{}.json", std::process::id()))
            .display()
            .to_string(),
        settings_path: scratch
            .join(format!("health-settings-{}.json", std::process::id()))
            .display()
            .to_string(),
    }
}

#[tokio::test]
async fn health_check_returns_200_ok() {
    // Arrange
    let router = register_routes(AppState::new(test_config()));

    // Act
    let response = router
        .oneshot(
            Request::builder()
                .uri("/health_check")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("should have gotten a response");

    let status = response.status();

    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("should have read body bytes");

    let health_response: HealthCheckResponse =
        serde_json::from_slice(&bytes).expect("should have deserialized JSON");

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health_response.message, "Crypto Vibe Check API is up.");
}
