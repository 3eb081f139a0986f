use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::clients::coingecko::MarketError;
use crate::clients::groq::VibeError;

pub enum ApiError {
    /// The rate-limit gate is tripped; outbound market calls are suppressed.
    RateLimited,
    Upstream(String),
    InvalidQuery(String),
    NotFound(String),
    MissingApiKey,
}

#[derive(Serialize)]
struct ApiErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::RateLimited => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Rate Limited",
                "Market-data API is rate limiting us; try again shortly.".to_owned(),
            ),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "Upstream Error", msg),
            ApiError::InvalidQuery(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not Found", msg),
            ApiError::MissingApiKey => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Vibe Check Unavailable",
                "No language-model API key is configured.".to_owned(),
            ),
        };

        let body = ApiErrorResponse { error, message };

        (status, Json(body)).into_response()
    }
}

impl From<MarketError> for ApiError {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::RateLimited => ApiError::RateLimited,
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<VibeError> for ApiError {
    fn from(err: VibeError) -> Self {
        match err {
            VibeError::MissingApiKey => ApiError::MissingApiKey,
            other => ApiError::Upstream(other.to_string()),
        }
    }
}
