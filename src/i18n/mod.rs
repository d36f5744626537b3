//! Internationalization (i18n) building blocks for runtime translation.
//!
//! # Architecture
//!
//! - `language`: Supported-language records and code normalization
//! - `registry`: Supported languages fetched once from the backend
//! - `cache`: Session-lifetime translation cache keyed by `TranslationKey`
//! - `in_flight`: Keys with a request on the wire (at most one per key)
//! - `metrics`: Translation observability counters
//!
//! The facade tying these together lives in `crate::provider`.

mod cache;
mod in_flight;
mod language;
mod metrics;
mod registry;

pub use cache::{CacheEntry, TranslationCache, TranslationKey};
pub use in_flight::InFlightTracker;
pub use language::{normalize_code, SupportedLanguage, DEFAULT_SOURCE_LANGUAGE};
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::LanguageRegistry;
