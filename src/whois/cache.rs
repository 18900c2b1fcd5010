//! WHOIS lookup caching functionality

use super::WhoisInfo;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Thread-safe memoization table for WHOIS lookups.
///
/// Keyed by the address string alone: lookup options never enter cache
/// identity, so the same address always hits the same entry. Entries
/// (including failed lookups) live for the lifetime of the cache; there
/// is no eviction policy.
pub struct WhoisCache {
    cache: Arc<Mutex<HashMap<String, WhoisInfo>>>,
}

impl WhoisCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Look up an address string in the cache
    pub fn get(&self, ip_str: &str) -> Option<WhoisInfo> {
        let cache = self.cache.lock().expect("mutex poisoned");
        cache.get(ip_str).cloned()
    }

    /// Insert a result into the cache
    pub fn insert(&self, ip_str: String, info: WhoisInfo) {
        let mut cache = self.cache.lock().expect("mutex poisoned");
        cache.insert(ip_str, info);
    }

    /// Get the number of entries in the cache
    pub fn len(&self) -> usize {
        let cache = self.cache.lock().expect("mutex poisoned");
        cache.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        let cache = self.cache.lock().expect("mutex poisoned");
        cache.is_empty()
    }

    /// Clear all entries from the cache
    pub fn clear(&self) {
        let mut cache = self.cache.lock().expect("mutex poisoned");
        cache.clear();
    }
}

impl Default for WhoisCache {
    fn default() -> Self {
        Self::new()
    }
}
