use serde::Deserialize;

fn default_coingecko_base_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_groq_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_groq_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_app_server_port() -> u16 {
    8080
}

fn default_watchlist_path() -> String {
    "watchlist.json".to_string()
}

fn default_settings_path() -> String {
    "settings.json".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_coingecko_base_url")]
    pub coingecko_base_url: String,
    #[serde(default = "default_groq_base_url")]
    pub groq_base_url: String,
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
    /// Absent key degrades the vibe-check endpoint to an error response.
    pub groq_api_key: Option<String>,
    #[serde(default = "default_app_server_port")]
    pub app_server_port: u16,
    #[serde(default = "default_watchlist_path")]
    pub watchlist_path: String,
    #[serde(default = "default_settings_path")]
    pub settings_path: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        let config = envy::from_env::<AppConfig>()?;

        if config.coingecko_base_url.trim().is_empty() {
            return Err(envy::Error::Custom(
                "COINGECKO_BASE_URL cannot be empty.".to_string(),
            ));
        }

        if config.groq_base_url.trim().is_empty() {
            return Err(envy::Error::Custom(
                "GROQ_BASE_URL cannot be empty.".to_string(),
            ));
        }

        if let Some(key) = &config.groq_api_key {
            if key.trim().is_empty() {
                return Err(envy::Error::Custom(
                    "GROQ_API_KEY cannot be empty when set.".to_string(),
                ));
            }
        }

        Ok(config)
    }
}
