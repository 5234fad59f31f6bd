use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

const DEFAULT_FIREWORKS_URL: &str = "https://api.fireworks.ai/inference/v1/chat/completions";
const DEFAULT_MODEL: &str = "accounts/fireworks/models/deepseek-v3p2";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub max_input_bytes: usize,
    pub fireworks_api_key: Option<String>,
    pub fireworks_url: String,
    pub fireworks_model: String,
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        // Dataset analysis works offline; only /chat-with-data needs the key.
        let fireworks_api_key = std::env::var("FIREWORKS_API_KEY").ok();
        if fireworks_api_key.is_none() {
            tracing::warn!("FIREWORKS_API_KEY not set; chat-with-data will be degraded");
        }

        let max_input_bytes = std::env::var("MAX_INPUT_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10 * 1024 * 1024);

        Ok(Config {
            port,
            max_input_bytes,
            fireworks_api_key,
            fireworks_url: std::env::var("FIREWORKS_URL")
                .unwrap_or_else(|_| DEFAULT_FIREWORKS_URL.to_string()),
            fireworks_model: std::env::var("FIREWORKS_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        })
    }
}
