//! WHOIS resolver service
//!
//! Service-oriented API over a [`WhoisClient`], adding the scope filter
//! (only public addresses go to the network), the per-address
//! memoization cache, and failure absorption: lookup failures become
//! descriptive summaries instead of errors.

use super::cache::WhoisCache;
use super::client::{CymruWhoisClient, WhoisClient};
use super::WhoisInfo;
use crate::classify::{classify, ClassifyError, IpCategory};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Callback fired once per completed network lookup, with the address
/// that was queried. Never fired for cache hits or filtered addresses.
pub type ProgressFn = Arc<dyn Fn(&str) + Send + Sync>;

/// WHOIS/ASN lookup service
///
/// Classifies each address first; only `Public` addresses reach the
/// underlying client. Every outcome, including lookup failures, is
/// cached per address string for the lifetime of this instance.
///
/// # Examples
///
/// ```no_run
/// use ipenrich::whois::WhoisLookup;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let whois = WhoisLookup::new();
///     let info = whois.lookup("8.8.8.8").await?;
///     println!("{}", info.asn_description);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct WhoisLookup {
    client: Arc<dyn WhoisClient>,
    cache: Arc<RwLock<WhoisCache>>,
    progress: Option<ProgressFn>,
}

impl WhoisLookup {
    /// Create a service backed by the default Team Cymru DNS client
    pub fn new() -> Self {
        Self::with_client(Arc::new(CymruWhoisClient::new()))
    }

    /// Create a service backed by a specific WHOIS client
    pub fn with_client(client: Arc<dyn WhoisClient>) -> Self {
        Self {
            client,
            cache: Arc::new(RwLock::new(WhoisCache::new())),
            progress: None,
        }
    }

    /// Create a service with a pre-populated cache
    pub fn with_cache(cache: WhoisCache, client: Arc<dyn WhoisClient>) -> Self {
        Self {
            client,
            cache: Arc::new(RwLock::new(cache)),
            progress: None,
        }
    }

    /// Attach a progress callback, fired once per completed network call
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Resolve WHOIS/ASN ownership for an IP address string.
    ///
    /// Returns an error only for an empty address. Non-public addresses
    /// and failed lookups resolve to a summary with an empty record;
    /// this operation never surfaces client errors.
    pub async fn lookup(&self, ip_str: &str) -> Result<WhoisInfo, ClassifyError> {
        let ip_str = ip_str.trim();
        if ip_str.is_empty() {
            return Err(ClassifyError::MissingAddress);
        }

        if let Some(hit) = self.cache.read().await.get(ip_str) {
            debug!("whois cache hit for {ip_str}");
            return Ok(hit);
        }

        let category = classify(ip_str)?;
        let info = if category == IpCategory::Public {
            self.lookup_public(ip_str).await
        } else {
            WhoisInfo::summary_only(format!("No ASN Information for IP type: {category}"))
        };

        self.cache.write().await.insert(ip_str.to_string(), info.clone());
        Ok(info)
    }

    /// Perform the network lookup for an address already classified as public
    async fn lookup_public(&self, ip_str: &str) -> WhoisInfo {
        // classify() accepted the string, so it parses
        let result = match ip_str.parse() {
            Ok(ip) => self.client.lookup_whois(ip).await,
            Err(_) => {
                return WhoisInfo::summary_only(format!(
                    "Error during lookup of {ip_str} LookupFailed"
                ))
            }
        };

        if let Some(progress) = &self.progress {
            progress(ip_str);
        }

        match result {
            Ok(record) => {
                let asn_description = record.asn_description().unwrap_or_default().to_string();
                WhoisInfo {
                    asn_description,
                    record,
                }
            }
            Err(err) => {
                debug!("whois lookup failed for {ip_str}: {err}");
                WhoisInfo::summary_only(format!(
                    "Error during lookup of {ip_str} {}",
                    err.kind()
                ))
            }
        }
    }

    /// Clear all cached WHOIS results
    pub async fn clear_cache(&self) {
        let cache = self.cache.write().await;
        cache.clear();
    }

    /// Get statistics about the cache
    pub async fn cache_stats(&self) -> CacheStats {
        let cache = self.cache.read().await;
        CacheStats {
            entries: cache.len(),
            is_empty: cache.is_empty(),
        }
    }

    /// Check if an address string is in the cache
    pub async fn is_cached(&self, ip_str: &str) -> bool {
        let cache = self.cache.read().await;
        cache.get(ip_str).is_some()
    }
}

impl Default for WhoisLookup {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the WHOIS cache
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of entries in the cache
    pub entries: usize,
    /// Whether the cache is empty
    pub is_empty: bool,
}
