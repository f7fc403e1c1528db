//! Content-addressed response cache, one per session.

use std::collections::HashMap;
use std::sync::Mutex;

use sha2::{Digest, Sha256};

/// Result of looking up a request in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    /// Never attempted.
    Miss,
    /// Computed successfully; the stored response.
    Hit(String),
    /// The last attempt failed with this message. Never served as a result.
    PreviouslyFailed(String),
}

#[derive(Debug, Clone)]
enum CacheEntry {
    Success(String),
    Failure(String),
}

/// Memoized model responses keyed by the SHA-256 of the request triple.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, key: &str) -> CacheStatus {
        match self.lock().get(key) {
            None => CacheStatus::Miss,
            Some(CacheEntry::Success(text)) => CacheStatus::Hit(text.clone()),
            Some(CacheEntry::Failure(msg)) => CacheStatus::PreviouslyFailed(msg.clone()),
        }
    }

    /// Stores a response, replacing any recorded failure.
    pub fn store_success(&self, key: String, response: String) {
        self.lock().insert(key, CacheEntry::Success(response));
    }

    /// Records a failure. An existing success is kept.
    pub fn record_failure(&self, key: String, message: String) {
        let mut entries = self.lock();
        if !matches!(entries.get(&key), Some(CacheEntry::Success(_))) {
            entries.insert(key, CacheEntry::Failure(message));
        }
    }

    pub fn entry_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A poisoned map is still structurally valid; keep serving it.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Hex SHA-256 over the length-prefixed parts, so that moving text between
/// parts always changes the key.
pub fn cache_key(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}
