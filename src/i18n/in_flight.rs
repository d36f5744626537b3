//! Bookkeeping for translation requests that are currently on the wire.

use crate::i18n::TranslationKey;
use std::collections::HashSet;

/// Keys with an outstanding network call. At most one call per key.
#[derive(Debug, Default)]
pub struct InFlightTracker {
    keys: HashSet<TranslationKey>,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: &TranslationKey) -> bool {
        self.keys.contains(key)
    }

    /// Mark a key as in flight. Returns `false` if it already was.
    pub fn add(&mut self, key: TranslationKey) -> bool {
        self.keys.insert(key)
    }

    pub fn remove(&mut self, key: &TranslationKey) -> bool {
        self.keys.remove(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
