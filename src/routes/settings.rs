use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::errors::api_error::ApiError;
use crate::state::AppState;
use crate::stores::settings::Settings;

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub language: String,
}

#[instrument(skip(state))]
pub async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.settings.current().await)
}

#[instrument(skip(state, request))]
pub async fn put_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<Settings>, ApiError> {
    let language = request.language.trim();
    if language.is_empty() {
        return Err(ApiError::InvalidQuery(
            "language must not be empty.".to_string(),
        ));
    }

    state.settings.set_language(language).await;
    info!(language = %language, "Display language updated.");
    Ok(Json(state.settings.current().await))
}
