//! Runtime translation layer for the component catalog.
//!
//! Rendering code calls [`TranslationProvider::t`] synchronously; misses are
//! fetched in the background, deduplicated per key, and cached for the
//! session.

pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod i18n;
pub mod preferences;
pub mod provider;
pub mod server;

pub use error::TranslationError;
pub use provider::{ActiveLanguage, ProviderBuilder, TranslationProvider, TranslationStatus};
