//! External WHOIS client boundary
//!
//! Defines the [`WhoisClient`] trait that the resolver service depends
//! on, its error taxonomy, and a default implementation backed by Team
//! Cymru's IP-to-ASN DNS service.

use super::{WhoisRecord, ASN_DESCRIPTION};
use async_trait::async_trait;
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::TokioResolver;
use std::net::IpAddr;
use std::sync::Arc;

/// Error type for WHOIS lookup operations
#[derive(Debug, thiserror::Error)]
pub enum WhoisError {
    /// The WHOIS service rejected the query for rate-limiting reasons
    #[error("rate limited by whois service: {0}")]
    RateLimited(String),

    /// The WHOIS host could not be reached
    #[error("whois host unreachable: {0}")]
    HostUnreachable(String),

    /// The registry returned no data or malformed data for the address
    #[error("registry error: {0}")]
    RegistryError(String),

    /// Any other lookup failure
    #[error("whois lookup failed: {0}")]
    LookupFailed(String),
}

impl WhoisError {
    /// Short kind name used when embedding a failure into a summary string
    pub fn kind(&self) -> &'static str {
        match self {
            WhoisError::RateLimited(_) => "RateLimited",
            WhoisError::HostUnreachable(_) => "HostUnreachable",
            WhoisError::RegistryError(_) => "RegistryError",
            WhoisError::LookupFailed(_) => "LookupFailed",
        }
    }
}

/// A single-address WHOIS lookup client.
///
/// Implementations return a field-mapping record including the
/// `asn_description` owner field, or one of the [`WhoisError`] failure
/// kinds. The resolver service treats all failure kinds uniformly.
#[async_trait]
pub trait WhoisClient: Send + Sync {
    /// Look up the WHOIS record for one IP address
    async fn lookup_whois(&self, ip: IpAddr) -> Result<WhoisRecord, WhoisError>;
}

/// WHOIS client backed by Team Cymru's IP-to-ASN DNS service.
///
/// Performs two TXT queries per address: one against
/// `origin.asn.cymru.com` (or `origin6` for IPv6) for the ASN, prefix,
/// country and registry, and one against `AS{n}.asn.cymru.com` for the
/// AS owner description.
pub struct CymruWhoisClient {
    resolver: Arc<TokioResolver>,
}

impl CymruWhoisClient {
    /// Create a client with the default (Cloudflare) DNS resolver
    pub fn new() -> Self {
        Self {
            resolver: Arc::new(
                TokioResolver::builder_with_config(
                    ResolverConfig::cloudflare(),
                    TokioConnectionProvider::default(),
                )
                .build(),
            ),
        }
    }

    /// Create a client using a specific DNS resolver
    pub fn with_resolver(resolver: Arc<TokioResolver>) -> Self {
        Self { resolver }
    }

    async fn txt_query(&self, name: String) -> Result<String, WhoisError> {
        let lookup = self
            .resolver
            .txt_lookup(name)
            .await
            .map_err(|e| WhoisError::LookupFailed(e.to_string()))?;

        let record = lookup
            .iter()
            .next()
            .ok_or_else(|| WhoisError::RegistryError("no TXT record in response".to_string()))?;

        Ok(record
            .iter()
            .map(|data| String::from_utf8_lossy(data))
            .collect::<Vec<_>>()
            .join(""))
    }
}

impl Default for CymruWhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WhoisClient for CymruWhoisClient {
    async fn lookup_whois(&self, ip: IpAddr) -> Result<WhoisRecord, WhoisError> {
        let origin = self.txt_query(origin_query(ip)).await?;
        let mut record = parse_origin_response(&origin)?;
        record.set("query", ip.to_string());

        // Second query for the AS owner description; a failure here
        // leaves the description empty rather than failing the lookup.
        if let Some(asn) = record.get("asn").map(str::to_string) {
            // Multi-origin responses list several ASNs; use the first
            let first_asn = asn.split_whitespace().next().unwrap_or(&asn).to_string();
            if let Ok(as_txt) = self.txt_query(format!("AS{first_asn}.asn.cymru.com")).await {
                if let Some(description) = parse_as_name_response(&as_txt) {
                    record.set(ASN_DESCRIPTION, description);
                }
            }
            record.set("asn", first_asn);
        }

        Ok(record)
    }
}

/// DNS name for the Cymru origin query of an address.
///
/// IPv4 uses reversed octets, IPv6 the reversed nibble form.
fn origin_query(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            format!(
                "{}.{}.{}.{}.origin.asn.cymru.com",
                octets[3], octets[2], octets[1], octets[0]
            )
        }
        IpAddr::V6(v6) => {
            let mut name = String::with_capacity(96);
            for byte in v6.octets().iter().rev() {
                name.push_str(&format!("{:x}.{:x}.", byte & 0xf, byte >> 4));
            }
            name.push_str("origin6.asn.cymru.com");
            name
        }
    }
}

/// Parse an origin TXT payload, e.g.
/// `"15169 | 8.8.8.0/24 | US | arin | 2000-03-30"`.
fn parse_origin_response(txt: &str) -> Result<WhoisRecord, WhoisError> {
    let parts: Vec<&str> = txt.split('|').map(str::trim).collect();
    if parts.len() < 3 {
        return Err(WhoisError::RegistryError(format!(
            "unexpected origin response: {txt}"
        )));
    }

    let mut record = WhoisRecord::new();
    record.set("asn", parts[0]);
    record.set("asn_cidr", parts[1]);
    record.set("asn_country_code", parts[2]);
    if let Some(registry) = parts.get(3) {
        record.set("asn_registry", *registry);
    }
    if let Some(date) = parts.get(4) {
        record.set("asn_date", *date);
    }
    Ok(record)
}

/// Parse an AS-name TXT payload, e.g.
/// `"15169 | US | arin | 2000-03-30 | GOOGLE, US"`.
fn parse_as_name_response(txt: &str) -> Option<String> {
    let parts: Vec<&str> = txt.split('|').map(str::trim).collect();
    if parts.len() >= 5 {
        Some(parts[4].to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_origin_query_v4() {
        let ip = IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8));
        assert_eq!(origin_query(ip), "8.8.8.8.origin.asn.cymru.com");

        let ip = IpAddr::V4(Ipv4Addr::new(104, 16, 1, 2));
        assert_eq!(origin_query(ip), "2.1.16.104.origin.asn.cymru.com");
    }

    #[test]
    fn test_origin_query_v6() {
        let ip = IpAddr::V6("2001:4860:4860::8888".parse::<Ipv6Addr>().unwrap());
        let name = origin_query(ip);
        assert!(name.ends_with("origin6.asn.cymru.com"));
        // 32 nibbles, each followed by a dot
        assert_eq!(name.matches('.').count(), 32 + 3);
        assert!(name.starts_with("8.8.8.8.0.0.0.0."));
    }

    #[test]
    fn test_parse_origin_response() {
        let record =
            parse_origin_response("15169 | 8.8.8.0/24 | US | arin | 2000-03-30").unwrap();
        assert_eq!(record.get("asn"), Some("15169"));
        assert_eq!(record.get("asn_cidr"), Some("8.8.8.0/24"));
        assert_eq!(record.get("asn_country_code"), Some("US"));
        assert_eq!(record.get("asn_registry"), Some("arin"));
        assert_eq!(record.get("asn_date"), Some("2000-03-30"));
    }

    #[test]
    fn test_parse_origin_response_minimal() {
        let record = parse_origin_response("13335 | 104.16.0.0/12 | US").unwrap();
        assert_eq!(record.get("asn"), Some("13335"));
        assert_eq!(record.get("asn_registry"), None);
    }

    #[test]
    fn test_parse_origin_response_malformed() {
        let result = parse_origin_response("garbage");
        assert!(matches!(result, Err(WhoisError::RegistryError(_))));
    }

    #[test]
    fn test_parse_as_name_response() {
        assert_eq!(
            parse_as_name_response("15169 | US | arin | 2000-03-30 | GOOGLE, US"),
            Some("GOOGLE, US".to_string())
        );
        assert_eq!(parse_as_name_response("15169 | US"), None);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(WhoisError::RateLimited(String::new()).kind(), "RateLimited");
        assert_eq!(
            WhoisError::HostUnreachable(String::new()).kind(),
            "HostUnreachable"
        );
        assert_eq!(
            WhoisError::RegistryError(String::new()).kind(),
            "RegistryError"
        );
        assert_eq!(WhoisError::LookupFailed(String::new()).kind(), "LookupFailed");
    }
}
