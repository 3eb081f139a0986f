//! # Vibe-Check Requester
//!
//! Asks a hosted completion endpoint for a stylized commentary on a coin's
//! price movement. The reply is expected in a strict two-line format
//! (`RATING: <n>` / `VIBE: <text>`) and parsed defensively: a missing or
//! non-numeric rating falls back to a neutral 5 with the raw text surfaced
//! as the comment.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_TOKENS: u32 = 200;
const NEUTRAL_RATING: u8 = 5;

#[derive(Debug, Error)]
pub enum VibeError {
    #[error("no language-model API key configured")]
    MissingApiKey,
    #[error("completion API returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion response had no content")]
    EmptyResponse,
}

/// Parsed vibe-check result.
#[derive(Debug, Clone, Serialize)]
pub struct VibeCheck {
    pub rating: u8,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Clone)]
pub struct VibeClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl VibeClient {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client construction should not fail");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// One completion call per vibe check. Callers cache the result and do
    /// not retry on failure.
    pub async fn vibe_check(
        &self,
        coin_name: &str,
        price_usd: f64,
        change_24h: f64,
        style: &str,
        language: &str,
    ) -> Result<VibeCheck, VibeError> {
        let api_key = self.api_key.as_deref().ok_or(VibeError::MissingApiKey)?;
        let prompt = build_prompt(coin_name, price_usd, change_24h, style, language);

        debug!(coin_name = %coin_name, style = %style, "Requesting vibe check.");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&json!({
                "model": self.model,
                "messages": [{ "role": "user", "content": prompt }],
                "max_tokens": MAX_TOKENS,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(VibeError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let completion = response.json::<ChatCompletionResponse>().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(VibeError::EmptyResponse)?;

        Ok(parse_vibe_reply(&content))
    }
}

fn build_prompt(
    coin_name: &str,
    price_usd: f64,
    change_24h: f64,
    style: &str,
    language: &str,
) -> String {
    format!(
        "The price of {coin_name} is ${price_usd:.2} and it has moved {change_24h:.2}% in 24 hours.\n\
         \n\
         Give me:\n\
         1. A vibe rating from 1-10 (1 = doom, 10 = moon)\n\
         2. A 2-sentence summary of the vibe in the style of {style}, written in the language '{language}'.\n\
         \n\
         Format exactly like:\n\
         RATING: [number]\n\
         VIBE: [your 2 sentences]"
    )
}

/// Line-oriented parse of the model reply. Rating defaults to neutral (5)
/// when the `RATING:` line is missing or non-numeric; the message defaults
/// to the raw trimmed reply when there is no `VIBE:` line.
pub fn parse_vibe_reply(content: &str) -> VibeCheck {
    let trimmed = content.trim();
    let mut rating = NEUTRAL_RATING;
    let mut message = trimmed.to_string();

    for line in trimmed.lines() {
        if let Some(rest) = line.strip_prefix("RATING:") {
            if let Some(token) = rest.split_whitespace().next() {
                if let Ok(parsed) = token.parse::<i64>() {
                    rating = parsed.clamp(1, 10) as u8;
                }
            }
        } else if let Some(rest) = line.strip_prefix("VIBE:") {
            message = rest.trim().to_string();
        }
    }

    VibeCheck { rating, message }
}
