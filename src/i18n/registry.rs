//! Language registry: the backend's supported languages, fetched once.
//!
//! A successful fetch is cached for the lifetime of the registry and never
//! invalidated. A failed fetch caches nothing, so the next caller fetches
//! again; no retry is scheduled on its own.

use crate::api::TranslationApi;
use crate::error::TranslationError;
use crate::i18n::SupportedLanguage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Clears the loading flag even when the fetching future is dropped early.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct LanguageRegistry {
    languages: OnceCell<Vec<SupportedLanguage>>,
    loading: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self {
            languages: OnceCell::new(),
            loading: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    /// Registry pre-populated with a fixed list (no network involved).
    pub fn with_languages(languages: Vec<SupportedLanguage>) -> Self {
        Self {
            languages: OnceCell::new_with(Some(languages)),
            loading: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    /// Get the supported languages, fetching them on first use.
    ///
    /// Concurrent first callers share a single request.
    pub async fn get_supported_languages(
        &self,
        api: &TranslationApi,
    ) -> Result<&[SupportedLanguage], TranslationError> {
        let languages = self
            .languages
            .get_or_try_init(|| async move {
                let loading = LoadingGuard::start(&self.loading);
                let result = api.get_supported_languages().await;
                drop(loading);

                match &result {
                    Ok(languages) => {
                        info!("Loaded {} supported languages", languages.len());
                        self.set_error(None);
                    }
                    Err(e) => {
                        warn!("Failed to load supported languages: {}", e);
                        self.set_error(Some(e.to_string()));
                    }
                }
                result
            })
            .await?;

        Ok(languages.as_slice())
    }

    /// Languages if they have been loaded already.
    pub fn cached(&self) -> Option<&[SupportedLanguage]> {
        self.languages.get().map(Vec::as_slice)
    }

    /// `Some(true/false)` once loaded, `None` while the list is unknown.
    pub fn supports(&self, code: &str) -> Option<bool> {
        self.cached()
            .map(|languages| languages.iter().any(|lang| lang.code == code))
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_error(&self, error: Option<String>) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = error;
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn languages_body() -> serde_json::Value {
        serde_json::json!([
            {"code": "en", "language": "English"},
            {"code": "fr", "language": "French"}
        ])
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = LanguageRegistry::new();
        assert!(registry.cached().is_none());
        assert_eq!(registry.supports("en"), None);
        assert!(!registry.is_loading());
        assert!(registry.last_error().is_none());
    }

    #[test]
    fn test_with_languages_supports() {
        let registry = LanguageRegistry::with_languages(vec![SupportedLanguage::new("en", "English")]);
        assert_eq!(registry.supports("en"), Some(true));
        assert_eq!(registry.supports("fr"), Some(false));
    }

    #[tokio::test]
    async fn test_fetches_once_and_caches_forever() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get-supported-languages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(languages_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = TranslationApi::new(reqwest::Client::new(), &mock_server.uri());
        let registry = LanguageRegistry::new();

        for _ in 0..3 {
            let languages = registry.get_supported_languages(&api).await.expect("Should load");
            assert_eq!(languages.len(), 2);
        }

        assert_eq!(registry.supports("fr"), Some(true));
        assert!(!registry.is_loading());
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_share_one_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get-supported-languages"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(languages_body())
                    .set_delay(std::time::Duration::from_millis(50)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = TranslationApi::new(reqwest::Client::new(), &mock_server.uri());
        let registry = LanguageRegistry::new();

        let (a, b) = tokio::join!(
            registry.get_supported_languages(&api),
            registry.get_supported_languages(&api)
        );
        assert!(a.is_ok());
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_failure_is_reported_and_not_cached() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get-supported-languages"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = TranslationApi::new(reqwest::Client::new(), &mock_server.uri());
        let registry = LanguageRegistry::new();

        assert!(registry.get_supported_languages(&api).await.is_err());
        assert!(registry.cached().is_none());
        assert!(registry.last_error().is_some());

        Mock::given(method("GET"))
            .and(path("/get-supported-languages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(languages_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        // A later request re-fetches and clears the error
        let languages = registry.get_supported_languages(&api).await.expect("Should load");
        assert_eq!(languages.len(), 2);
        assert!(registry.last_error().is_none());
    }

    #[tokio::test]
    async fn test_cancelled_fetch_clears_loading() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get-supported-languages"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(languages_body())
                    .set_delay(std::time::Duration::from_millis(300)),
            )
            .mount(&mock_server)
            .await;

        let api = TranslationApi::new(reqwest::Client::new(), &mock_server.uri());
        let registry = LanguageRegistry::new();

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            registry.get_supported_languages(&api),
        )
        .await;
        assert!(result.is_err());

        assert!(!registry.is_loading());
        assert!(registry.cached().is_none());

        // The abandoned fetch left nothing behind; the next caller loads normally
        let languages = registry.get_supported_languages(&api).await.expect("Should load");
        assert_eq!(languages.len(), 2);
    }
}
