//! ipenrich - IP address classification and WHOIS/ASN enrichment
//!
//! This library enriches security-investigation data with IP address
//! metadata: it classifies addresses into network-scope categories,
//! resolves public addresses to their registered autonomous-system
//! owner, and merges the results back into Arrow record batches,
//! deduplicating and caching repeated lookups.
//!
//! # Examples
//!
//! ```no_run
//! use ipenrich::{classify, IpCategory, WhoisLookup};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     assert_eq!(classify("8.8.8.8")?, IpCategory::Public);
//!
//!     let whois = WhoisLookup::new();
//!     let info = whois.lookup("8.8.8.8").await?;
//!     println!("{}", info.asn_description);
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod entities;
pub mod enrich;
pub mod whois;

// Re-export core types for library users
pub use classify::{classify, classify_addr, ClassifyError, IpCategory};
pub use entities::{to_ip_entities, AddressSource, GeoLocation, GeoLookup, IpEntity};
pub use enrich::{EnrichMode, EnrichOptions, TableEnricher};
pub use whois::{WhoisCache, WhoisClient, WhoisError, WhoisInfo, WhoisLookup, WhoisRecord};
