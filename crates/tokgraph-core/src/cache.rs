//! Optional memoization of extraction results.
//!
//! The extractor keeps no state; this wrapper sits outside it and reuses results for
//! byte-identical responses (repeated engine answers across parameter sweeps are common).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::extract::{extract, ExtractedFields};
use crate::hash::{response_digest, Digest32};

/// Content-addressed cache of [`ExtractedFields`].
#[derive(Default)]
pub struct ExtractionCache {
    entries: Mutex<HashMap<Digest32, Arc<ExtractedFields>>>,
}

impl ExtractionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached extraction for `raw`, extracting on a miss.
    ///
    /// The second element is `true` on a cache hit.
    pub fn get_or_extract(&self, raw: &str) -> (Arc<ExtractedFields>, bool) {
        let key = response_digest(raw);
        if let Some(hit) = self.lookup(&key) {
            return (hit, true);
        }

        // Extract outside the lock; a concurrent miss on the same key does redundant work only.
        let fields = Arc::new(extract(raw));
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let stored = entries.entry(key).or_insert_with(|| Arc::clone(&fields));
        (Arc::clone(stored), false)
    }

    fn lookup(&self, key: &Digest32) -> Option<Arc<ExtractedFields>> {
        let entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
