//! Best-effort IP geolocation used to guess an initial language.
//!
//! The country code returned by the geolocation service is lowercased and
//! used directly as a language code ("FR" -> "fr"). Whether that guess is
//! usable is decided by the caller against the language registry.

use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct GeoResponse {
    status: String,
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeoDetector {
    client: reqwest::Client,
    url: String,
}

impl GeoDetector {
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }

    /// Guess a language code from the caller's IP address.
    ///
    /// Never fails: any network, status or parse problem yields `None`.
    pub async fn detect(&self) -> Option<String> {
        let response = match self.client.get(&self.url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Geolocation request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            debug!("Geolocation returned HTTP {}", response.status());
            return None;
        }

        let body: GeoResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                debug!("Geolocation response unreadable: {}", e);
                return None;
            }
        };

        if body.status != "success" {
            debug!("Geolocation status was '{}'", body.status);
            return None;
        }

        body.country_code
            .as_deref()
            .and_then(crate::i18n::normalize_code)
            .map(|code| code.to_lowercase())
    }
}
