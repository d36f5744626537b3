//! Session-lifetime translation cache.
//!
//! Entries are keyed by a structured [`TranslationKey`] rather than a
//! delimiter-joined string, so source text containing any character can
//! never alias another key. Entries are immutable and never evicted.

use std::collections::HashMap;

/// Identifies one translation unit: (target language, source text, source language).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationKey {
    pub target_language: String,
    pub source_text: String,
    pub source_language: String,
}

impl TranslationKey {
    pub fn new(
        target_language: impl Into<String>,
        source_text: impl Into<String>,
        source_language: impl Into<String>,
    ) -> Self {
        Self {
            target_language: target_language.into(),
            source_text: source_text.into(),
            source_language: source_language.into(),
        }
    }

    /// Same source text and language, different target.
    pub fn retarget(&self, target_language: &str) -> Self {
        Self {
            target_language: target_language.to_string(),
            source_text: self.source_text.clone(),
            source_language: self.source_language.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub translated_text: String,
}

#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: HashMap<TranslationKey, CacheEntry>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &TranslationKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Store an entry. The first value written for a key is kept.
    ///
    /// Returns `false` when the key was already populated.
    pub fn set(&mut self, key: TranslationKey, entry: CacheEntry) -> bool {
        use std::collections::hash_map::Entry;

        match self.entries.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
