//! In-memory TTL cache for merged character results.
//!
//! Single-process only. Concurrent fetches for the same name may both miss
//! and both scrape; they converge once either writes. That stampede is an
//! accepted inefficiency, not a correctness hazard.

use crate::model::CharacterInfo;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct CacheEntry {
    value: CharacterInfo,
    stored_at: Instant,
}

/// Keyed TTL store. Keys are the caller's responsibility to normalize
/// (the pipeline lower-cases them).
pub struct ResultCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Cached value for `key`, if present and not expired.
    pub async fn get(&self, key: &str) -> Option<CharacterInfo> {
        let entries = self.entries.lock().await;
        entries.get(key).and_then(|e| {
            if e.stored_at.elapsed() < self.ttl {
                Some(e.value.clone())
            } else {
                None
            }
        })
    }

    /// Store `value` under `key`; the TTL clock starts now.
    pub async fn set(&self, key: &str, value: CharacterInfo) {
        self.entries.lock().await.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }
}
