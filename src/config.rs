use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GEO_API_URL: &str = "http://ip-api.com/json/?fields=status,countryCode";

#[derive(Debug, Clone)]
pub struct Config {
    // Translation backend
    pub api_base: String,
    pub http_timeout: Duration,

    // Language defaults
    pub default_language: String,
    pub geo_detection: bool,
    pub geo_api_url: String,

    // Durable preference storage
    pub preferences_file: PathBuf,

    // Preview server
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_base = std::env::var("TRANSLATION_API_BASE")
            .context("TRANSLATION_API_BASE not set")?;

        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            http_timeout: Duration::from_secs(
                std::env::var("HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),

            default_language: std::env::var("DEFAULT_LANGUAGE")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "en".to_string()),
            // Anything but an explicit opt-out keeps detection on
            geo_detection: std::env::var("GEO_DETECTION")
                .map(|v| !matches!(v.trim().to_lowercase().as_str(), "0" | "false" | "off" | "no"))
                .unwrap_or(true),
            geo_api_url: std::env::var("GEO_API_URL")
                .unwrap_or_else(|_| DEFAULT_GEO_API_URL.to_string()),

            preferences_file: std::env::var("PREFERENCES_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/preferences.json")),

            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }

    /// Build a reqwest client honoring the configured timeout.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()
            .context("Failed to build HTTP client")
    }
}
