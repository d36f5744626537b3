//! Client for the remote translation backend.
//!
//! Two endpoints are consumed:
//! - `GET  {base}/get-supported-languages`
//! - `POST {base}/translate`

use crate::error::TranslationError;
use crate::i18n::SupportedLanguage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Translate request body
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    language_to: &'a str,
    language_from: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translated_text: String,
}

/// Error body the backend sends with non-2xx responses (FastAPI style)
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct TranslationApi {
    client: reqwest::Client,
    base_url: String,
}

impl TranslationApi {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the list of languages the backend can translate into.
    pub async fn get_supported_languages(&self) -> Result<Vec<SupportedLanguage>, TranslationError> {
        let url = format!("{}/get-supported-languages", self.base_url);
        debug!("Fetching supported languages from {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(api_error(response, "Failed to fetch supported languages").await);
        }

        response
            .json::<Vec<SupportedLanguage>>()
            .await
            .map_err(|e| TranslationError::InvalidResponse {
                endpoint: "get-supported-languages".to_string(),
                reason: e.to_string(),
            })
    }

    /// Translate `text` from `language_from` into `language_to`.
    pub async fn translate(
        &self,
        text: &str,
        language_to: &str,
        language_from: &str,
    ) -> Result<String, TranslationError> {
        let url = format!("{}/translate", self.base_url);
        debug!("Translating {} chars {} -> {}", text.len(), language_from, language_to);

        let response = self
            .client
            .post(&url)
            .json(&TranslateRequest {
                text,
                language_to,
                language_from,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response, "Translation failed").await);
        }

        let body: TranslateResponse =
            response
                .json()
                .await
                .map_err(|e| TranslationError::InvalidResponse {
                    endpoint: "translate".to_string(),
                    reason: e.to_string(),
                })?;

        Ok(body.translated_text)
    }
}

/// Turn a non-2xx response into an API error, preferring the backend's `detail`.
async fn api_error(response: reqwest::Response, fallback: &str) -> TranslationError {
    let status = response.status().as_u16();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.detail)
        .map(|detail| match detail {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
        .unwrap_or_else(|| format!("{} (HTTP {})", fallback, status));

    TranslationError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn api_for(server: &MockServer) -> TranslationApi {
        TranslationApi::new(reqwest::Client::new(), &server.uri())
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = TranslationApi::new(reqwest::Client::new(), "http://localhost:8000/");
        assert_eq!(api.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_translate_request_serialization() {
        let request = TranslateRequest {
            text: "Hello",
            language_to: "fr",
            language_from: "en",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["text"], "Hello");
        assert_eq!(json["language_to"], "fr");
        assert_eq!(json["language_from"], "en");
    }

    #[tokio::test]
    async fn test_get_supported_languages_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get-supported-languages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"code": "en", "language": "English"},
                {"code": "fr", "language": "French"}
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let languages = api_for(&mock_server)
            .get_supported_languages()
            .await
            .expect("Should succeed");

        assert_eq!(languages.len(), 2);
        assert_eq!(languages[0].code, "en");
        assert_eq!(languages[1].display_name, "French");
    }

    #[tokio::test]
    async fn test_get_supported_languages_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get-supported-languages"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&mock_server)
            .await;

        let err = api_for(&mock_server)
            .get_supported_languages()
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert!(err.to_string().contains("Failed to fetch supported languages"));
    }

    #[tokio::test]
    async fn test_get_supported_languages_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get-supported-languages"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let err = api_for(&mock_server)
            .get_supported_languages()
            .await
            .unwrap_err();

        assert!(matches!(err, TranslationError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_translate_success_sends_expected_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(body_json(serde_json::json!({
                "text": "Hello",
                "language_to": "fr",
                "language_from": "en"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"translated_text": "Bonjour"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let translated = api_for(&mock_server)
            .translate("Hello", "fr", "en")
            .await
            .expect("Should succeed");

        assert_eq!(translated, "Bonjour");
    }

    #[tokio::test]
    async fn test_translate_error_uses_detail() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/translate"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"detail": "Unsupported language: xx"})),
            )
            .mount(&mock_server)
            .await;

        let err = api_for(&mock_server)
            .translate("Hello", "xx", "en")
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("Unsupported language: xx"));
    }

    #[tokio::test]
    async fn test_translate_error_without_detail_is_generic() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/translate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let err = api_for(&mock_server)
            .translate("Hello", "fr", "en")
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("Translation failed"));
        assert!(msg.contains("500"));
    }

    #[tokio::test]
    async fn test_translate_missing_field_is_invalid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/translate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "?"})))
            .mount(&mock_server)
            .await;

        let err = api_for(&mock_server)
            .translate("Hello", "fr", "en")
            .await
            .unwrap_err();

        assert!(matches!(err, TranslationError::InvalidResponse { .. }));
    }
}
