use crypto_vibe_api::{config::AppConfig, routes::register_routes, state::AppState};
use dotenvy::dotenv;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().expect("should have loaded config.");
    let port = config.app_server_port;

    let state = AppState::new(config);
    let app = register_routes(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await.unwrap();

    println!("Listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
}
