//! Translation provider: the context object the rendering layer talks to.
//!
//! `t()` is synchronous and never blocks on I/O. It reads the cache and, on a
//! miss, enqueues a job for a background worker that performs the network
//! call and fills the cache. Consumers learn that something changed through
//! [`TranslationProvider::subscribe`] and simply call `t()` again.
//!
//! Decision order for every `t()` call:
//! 1. target language equals source language: return the text unchanged
//! 2. language detection still running: return the text unchanged
//! 3. cached translation for the current language: return it
//! 4. not already in flight: mark it and enqueue a fetch
//! 5. cached translation for the previous language: return it
//! 6. return the text unchanged

use crate::api::TranslationApi;
use crate::config::Config;
use crate::error::TranslationError;
use crate::geo::GeoDetector;
use crate::i18n::{
    normalize_code, CacheEntry, InFlightTracker, LanguageRegistry, MetricsReport,
    SupportedLanguage, TranslationCache, TranslationKey, TranslationMetrics,
    DEFAULT_SOURCE_LANGUAGE,
};
use crate::preferences::{
    FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, CURRENT_LANGUAGE_KEY,
};
use anyhow::Result;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, Weak};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Current and previous target language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveLanguage {
    pub current: String,
    pub previous: Option<String>,
}

/// Snapshot of the provider's observable state, for spinners and error badges.
#[derive(Debug, Clone, Serialize)]
pub struct TranslationStatus {
    pub current_language: String,
    pub previous_language: Option<String>,
    pub detection_complete: bool,
    pub is_translating: bool,
    pub pending: usize,
    pub cached: usize,
    pub translation_error: Option<String>,
    pub languages: Option<Vec<SupportedLanguage>>,
    pub is_loading_languages: bool,
    pub languages_error: Option<String>,
}

/// Who asked for a language switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LanguageSource {
    Chosen,
    Detected,
}

#[derive(Debug)]
struct TranslationJob {
    key: TranslationKey,
}

/// Cache and in-flight set share one lock so check-then-add is atomic.
#[derive(Debug, Default)]
struct TranslationState {
    cache: TranslationCache,
    in_flight: InFlightTracker,
}

struct Inner {
    api: TranslationApi,
    registry: LanguageRegistry,
    geo: Option<GeoDetector>,
    preferences: Box<dyn PreferenceStore>,
    language: RwLock<ActiveLanguage>,
    state: Mutex<TranslationState>,
    detection_started: AtomicBool,
    detection_complete: AtomicBool,
    // Set once the user picks a language; detection must not override it
    explicit_choice: AtomicBool,
    translation_error: Mutex<Option<String>>,
    jobs: mpsc::UnboundedSender<TranslationJob>,
    revision: watch::Sender<u64>,
    metrics: TranslationMetrics,
    runtime: Handle,
}

/// Handle to the translation context. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct TranslationProvider {
    inner: Arc<Inner>,
}

pub struct ProviderBuilder {
    api: TranslationApi,
    registry: LanguageRegistry,
    geo: Option<GeoDetector>,
    preferences: Option<Box<dyn PreferenceStore>>,
    default_language: String,
}

impl ProviderBuilder {
    pub fn registry(mut self, registry: LanguageRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Enable one-time IP based language detection.
    pub fn geo_detector(mut self, geo: GeoDetector) -> Self {
        self.geo = Some(geo);
        self
    }

    pub fn preferences(mut self, store: impl PreferenceStore + 'static) -> Self {
        self.preferences = Some(Box::new(store));
        self
    }

    pub fn default_language(mut self, code: &str) -> Self {
        if let Some(code) = normalize_code(code) {
            self.default_language = code;
        }
        self
    }

    /// Build the provider and start its background worker.
    ///
    /// Fails with [`TranslationError::NoRuntime`] outside a tokio runtime.
    /// When no language is stored and a geo detector is configured, detection
    /// starts immediately and `t()` passes text through until it settles.
    pub fn build(self) -> Result<TranslationProvider, TranslationError> {
        let runtime = Handle::try_current().map_err(|_| TranslationError::NoRuntime)?;

        let preferences: Box<dyn PreferenceStore> = match self.preferences {
            Some(store) => store,
            None => Box::new(MemoryPreferenceStore::new()),
        };

        let stored = match preferences.get(CURRENT_LANGUAGE_KEY) {
            Ok(value) => value.as_deref().and_then(normalize_code),
            Err(e) => {
                warn!("Could not read stored language preference: {}", e);
                None
            }
        };

        let needs_detection = stored.is_none() && self.geo.is_some();
        let current = stored.clone().unwrap_or(self.default_language);
        info!(
            "Translation provider starting in '{}' ({})",
            current,
            if stored.is_some() {
                "stored preference"
            } else if needs_detection {
                "detecting"
            } else {
                "default"
            }
        );

        let (jobs, rx) = mpsc::unbounded_channel();
        let (revision, _) = watch::channel(0u64);

        let inner = Arc::new(Inner {
            api: self.api,
            registry: self.registry,
            geo: self.geo,
            preferences,
            language: RwLock::new(ActiveLanguage {
                current,
                previous: None,
            }),
            state: Mutex::new(TranslationState::default()),
            detection_started: AtomicBool::new(!needs_detection),
            detection_complete: AtomicBool::new(!needs_detection),
            explicit_choice: AtomicBool::new(false),
            translation_error: Mutex::new(None),
            jobs,
            revision,
            metrics: TranslationMetrics::new(),
            runtime,
        });

        inner.runtime.spawn(run_worker(Arc::downgrade(&inner), rx));

        let provider = TranslationProvider { inner };
        if needs_detection {
            provider.spawn_detection();
        }
        Ok(provider)
    }
}

impl TranslationProvider {
    pub fn builder(api: TranslationApi) -> ProviderBuilder {
        ProviderBuilder {
            api,
            registry: LanguageRegistry::new(),
            geo: None,
            preferences: None,
            default_language: DEFAULT_SOURCE_LANGUAGE.to_string(),
        }
    }

    /// Wire up a provider from environment configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = config.http_client()?;
        let mut builder = Self::builder(TranslationApi::new(client.clone(), &config.api_base))
            .preferences(FilePreferenceStore::new(&config.preferences_file))
            .default_language(&config.default_language);

        if config.geo_detection {
            builder = builder.geo_detector(GeoDetector::new(client, &config.geo_api_url));
        }

        Ok(builder.build()?)
    }

    /// Translate English source text into the current language.
    pub fn t(&self, text: &str) -> String {
        self.t_from(text, DEFAULT_SOURCE_LANGUAGE)
    }

    /// Translate `text` written in `source_language` into the current language.
    ///
    /// Always returns immediately; never fails.
    pub fn t_from(&self, text: &str, source_language: &str) -> String {
        let ActiveLanguage { current, previous } = self.inner.active_language();

        if current == source_language {
            return text.to_string();
        }

        if !self.inner.detection_complete.load(Ordering::SeqCst) {
            return text.to_string();
        }

        let key = TranslationKey::new(current, text, source_language);
        let mut state = self.inner.lock_state();

        if let Some(entry) = state.cache.get(&key) {
            self.inner.metrics.record_cache_hit();
            return entry.translated_text.clone();
        }
        self.inner.metrics.record_cache_miss();

        if state.in_flight.add(key.clone()) {
            debug!("Queueing translation to '{}'", key.target_language);
            if self.inner.jobs.send(TranslationJob { key: key.clone() }).is_err() {
                warn!("Translation worker is gone; dropping request");
                state.in_flight.remove(&key);
            }
        }

        if let Some(previous) = previous {
            if let Some(entry) = state.cache.get(&key.retarget(&previous)) {
                self.inner.metrics.record_stale_fallback();
                return entry.translated_text.clone();
            }
        }

        text.to_string()
    }

    pub fn current_language(&self) -> String {
        self.inner.active_language().current
    }

    pub fn active_language(&self) -> ActiveLanguage {
        self.inner.active_language()
    }

    /// Switch the target language and persist the choice.
    ///
    /// Empty codes are rejected. Once the registry has been loaded, codes it
    /// does not list are rejected too; before that, any code is accepted.
    pub fn set_current_language(&self, code: &str) -> Result<(), TranslationError> {
        let code = normalize_code(code)
            .ok_or_else(|| TranslationError::InvalidLanguage(code.to_string()))?;

        if self.inner.registry.supports(&code) == Some(false) {
            return Err(TranslationError::UnsupportedLanguage(code));
        }

        self.inner.switch_language(&code, LanguageSource::Chosen);
        Ok(())
    }

    /// Start one-time language detection in the background.
    ///
    /// Does nothing if detection already ran, is running, or was not needed.
    pub fn spawn_detection(&self) {
        if self.inner.detection_started.swap(true, Ordering::SeqCst) {
            return;
        }
        let inner = Arc::clone(&self.inner);
        self.inner
            .runtime
            .spawn(async move { inner.run_detection().await });
    }

    pub fn detection_complete(&self) -> bool {
        self.inner.detection_complete.load(Ordering::SeqCst)
    }

    /// Supported languages, fetched on first use and cached afterwards.
    pub async fn languages(&self) -> Result<Vec<SupportedLanguage>, TranslationError> {
        let was_loaded = self.inner.registry.cached().is_some();
        let languages = self
            .inner
            .registry
            .get_supported_languages(&self.inner.api)
            .await
            .map(<[SupportedLanguage]>::to_vec);
        // Only a real fetch changes what status() reports
        if !was_loaded {
            self.inner.bump();
        }
        languages
    }

    /// Seed the cache with a known translation (e.g. shipped with the page).
    pub fn prime(&self, key: TranslationKey, translated_text: impl Into<String>) {
        let inserted = self.inner.lock_state().cache.set(
            key,
            CacheEntry {
                translated_text: translated_text.into(),
            },
        );
        if inserted {
            self.inner.bump();
        }
    }

    /// Receiver whose value changes whenever consumers should re-render.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    pub fn is_translating(&self) -> bool {
        !self.inner.lock_state().in_flight.is_empty()
    }

    /// Wait until no translation request is outstanding.
    pub async fn wait_idle(&self) {
        let mut rx = self.subscribe();
        loop {
            if !self.is_translating() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Wait until language detection has settled.
    pub async fn wait_for_detection(&self) {
        let mut rx = self.subscribe();
        loop {
            if self.detection_complete() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    pub fn status(&self) -> TranslationStatus {
        let ActiveLanguage { current, previous } = self.inner.active_language();
        let (pending, cached) = {
            let state = self.inner.lock_state();
            (state.in_flight.len(), state.cache.len())
        };

        TranslationStatus {
            current_language: current,
            previous_language: previous,
            detection_complete: self.detection_complete(),
            is_translating: pending > 0,
            pending,
            cached,
            translation_error: self.inner.translation_error(),
            languages: self.inner.registry.cached().map(<[SupportedLanguage]>::to_vec),
            is_loading_languages: self.inner.registry.is_loading(),
            languages_error: self.inner.registry.last_error(),
        }
    }

    pub fn metrics(&self) -> MetricsReport {
        self.inner.metrics.report()
    }
}

impl Inner {
    fn active_language(&self) -> ActiveLanguage {
        self.language
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, TranslationState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn translation_error(&self) -> Option<String> {
        self.translation_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_translation_error(&self, error: Option<String>) {
        *self
            .translation_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = error;
    }

    fn bump(&self) {
        self.revision.send_modify(|revision| *revision = revision.wrapping_add(1));
    }

    /// Persist and activate a language, remembering the one it replaces.
    ///
    /// The write lock is held across the explicit-choice check, the store
    /// write and the swap, so concurrent switches persist the same language
    /// they leave active. Returns false when a detected language lost to an
    /// explicit choice.
    fn switch_language(&self, code: &str, source: LanguageSource) -> bool {
        let changed = {
            let mut language = self
                .language
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            match source {
                LanguageSource::Chosen => self.explicit_choice.store(true, Ordering::SeqCst),
                LanguageSource::Detected if self.explicit_choice.load(Ordering::SeqCst) => {
                    return false;
                }
                LanguageSource::Detected => {}
            }

            // Storage is best effort: the in-memory switch still happens
            if let Err(e) = self.preferences.set(CURRENT_LANGUAGE_KEY, code) {
                warn!("Failed to persist language preference '{}': {}", code, e);
            }

            if language.current == code {
                false
            } else {
                let previous = std::mem::replace(&mut language.current, code.to_string());
                language.previous = Some(previous);
                true
            }
        };

        if changed {
            info!("Active language set to '{}'", code);
            self.bump();
        }
        true
    }

    async fn run_detection(&self) {
        let detected = match &self.geo {
            Some(geo) => geo.detect().await,
            None => None,
        };

        if let Some(code) = detected {
            match self.registry.get_supported_languages(&self.api).await {
                Ok(languages) if languages.iter().any(|lang| lang.code == code) => {
                    if self.switch_language(&code, LanguageSource::Detected) {
                        info!("Detected language '{}' from geolocation", code);
                    } else {
                        debug!("Detected '{}' but a language was already chosen", code);
                    }
                }
                Ok(_) => debug!("Detected '{}' is not a supported language", code),
                Err(e) => debug!("Skipping detected '{}': registry unavailable ({})", code, e),
            }
        }

        self.detection_complete.store(true, Ordering::SeqCst);
        self.bump();
    }

    async fn process(&self, job: TranslationJob) {
        let key = job.key;
        self.metrics.record_api_call();

        let result = self
            .api
            .translate(&key.source_text, &key.target_language, &key.source_language)
            .await;

        {
            let mut state = self.lock_state();
            if let Ok(translated) = &result {
                state.cache.set(
                    key.clone(),
                    CacheEntry {
                        translated_text: translated.clone(),
                    },
                );
            }
            state.in_flight.remove(&key);
        }

        match result {
            Ok(_) => self.set_translation_error(None),
            Err(e) => {
                self.metrics.record_api_failure();
                warn!("Translation to '{}' failed: {}", key.target_language, e);
                self.set_translation_error(Some(e.to_string()));
            }
        }

        self.bump();
    }
}

/// Drain the job queue, running each job on its own task.
async fn run_worker(weak: Weak<Inner>, mut rx: mpsc::UnboundedReceiver<TranslationJob>) {
    while let Some(job) = rx.recv().await {
        let Some(inner) = weak.upgrade() else {
            break;
        };
        tokio::spawn(async move { inner.process(job).await });
    }
    debug!("Translation worker stopped");
}
