//! WHOIS/ASN ownership lookup
//!
//! Resolves public IP addresses to their registered autonomous-system
//! owner. Non-public addresses are filtered out before any network
//! activity, and all results (including failures) are memoized per
//! address string for the lifetime of the [`WhoisLookup`] service.

pub mod cache;
pub mod client;
pub mod service;

pub use cache::WhoisCache;
pub use client::{CymruWhoisClient, WhoisClient, WhoisError};
pub use service::WhoisLookup;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name carrying the short-form AS owner description.
pub const ASN_DESCRIPTION: &str = "asn_description";

/// A single WHOIS result: an opaque mapping of field name to value.
///
/// Field names follow the registry data shape (`asn`, `asn_cidr`,
/// `asn_country_code`, `asn_registry`, `asn_date`, `asn_description`,
/// `query`), but callers should treat the set as open-ended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WhoisRecord {
    fields: BTreeMap<String, String>,
}

impl WhoisRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Get a field value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// The AS owner description field, if present
    pub fn asn_description(&self) -> Option<&str> {
        self.get(ASN_DESCRIPTION)
    }

    /// True if the record carries no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields in the record
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over `(field name, value)` pairs in field-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Field names present in this record, in sorted order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl FromIterator<(String, String)> for WhoisRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Result of one WHOIS resolution: a human-readable summary plus the
/// raw record. For non-public addresses and failed lookups the summary
/// describes why and the record is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoisInfo {
    /// Short-form owner description, or a diagnostic summary
    pub asn_description: String,
    /// Full record as returned by the WHOIS client
    pub record: WhoisRecord,
}

impl WhoisInfo {
    /// Build a result carrying only a summary and an empty record
    pub fn summary_only(asn_description: impl Into<String>) -> Self {
        Self {
            asn_description: asn_description.into(),
            record: WhoisRecord::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_fields() {
        let mut record = WhoisRecord::new();
        assert!(record.is_empty());

        record.set("asn", "15169");
        record.set(ASN_DESCRIPTION, "GOOGLE, US");

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("asn"), Some("15169"));
        assert_eq!(record.asn_description(), Some("GOOGLE, US"));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_record_field_names_sorted() {
        let record: WhoisRecord = [
            ("query".to_string(), "8.8.8.8".to_string()),
            ("asn".to_string(), "15169".to_string()),
        ]
        .into_iter()
        .collect();

        let names: Vec<&str> = record.field_names().collect();
        assert_eq!(names, vec!["asn", "query"]);
    }

    #[test]
    fn test_record_json_round_trip() {
        let mut record = WhoisRecord::new();
        record.set("asn", "13335");
        record.set("asn_cidr", "104.16.0.0/12");

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"asn\":\"13335\""));

        let back: WhoisRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_summary_only() {
        let info = WhoisInfo::summary_only("No ASN Information for IP type: Private");
        assert!(info.record.is_empty());
        assert!(info.asn_description.contains("Private"));
    }
}
