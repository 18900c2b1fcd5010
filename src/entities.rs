//! IP address entities
//!
//! Converts raw address strings (delimited text or a table column) into
//! structured entities, deduplicating repeated addresses and optionally
//! delegating to a geolocation collaborator for location fields.

use arrow::array::{Array, StringArray};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors from entity construction
#[derive(Debug, Error)]
pub enum EntityError {
    /// The text source contained no addresses
    #[error("an IP address value must be specified")]
    MissingAddress,

    /// The named address column does not exist in the table
    #[error("column {0:?} not found in table")]
    MissingColumn(String),

    /// The named address column is not a string column
    #[error("column {0:?} is not a string column")]
    NotAStringColumn(String),

    /// The geolocation collaborator failed
    #[error("geolocation lookup failed: {0}")]
    Geo(#[source] anyhow::Error),
}

/// Geographic location fields for an address entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// ISO country code
    pub country_code: Option<String>,
    /// Country name
    pub country_name: Option<String>,
    /// State or region
    pub state: Option<String>,
    /// City name
    pub city: Option<String>,
    /// Longitude in decimal degrees
    pub longitude: Option<f64>,
    /// Latitude in decimal degrees
    pub latitude: Option<f64>,
}

/// A structured IP address entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpEntity {
    /// The address string this entity was built from
    pub address: String,
    /// Location fields populated by a geolocation collaborator
    pub location: Option<GeoLocation>,
}

impl IpEntity {
    /// Create an entity for an address with no location data
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            location: None,
        }
    }
}

/// Geolocation collaborator boundary.
///
/// Invoked once per constructed entity, in construction order.
#[async_trait]
pub trait GeoLookup: Send + Sync {
    /// Populate location fields on the entity
    async fn lookup(&self, entity: &mut IpEntity) -> anyhow::Result<()>;
}

/// Source of raw address strings for entity construction.
///
/// Exactly one source is supplied by construction; there is no
/// both-or-neither case to validate at runtime.
pub enum AddressSource<'a> {
    /// A single address, or multiple delimited by commas/whitespace
    Text(&'a str),
    /// A string column of an Arrow record batch
    Column {
        /// The table holding the addresses
        batch: &'a RecordBatch,
        /// Name of the address column
        column: &'a str,
    },
}

/// Convert raw address strings into [`IpEntity`] values.
///
/// Addresses are split on commas and whitespace and deduplicated in
/// first-seen order; each distinct address yields exactly one entity.
/// When a [`GeoLookup`] collaborator is supplied it is invoked once per
/// entity, in construction order.
pub async fn to_ip_entities(
    source: AddressSource<'_>,
    geo: Option<&dyn GeoLookup>,
) -> Result<Vec<IpEntity>, EntityError> {
    let mut entities = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    match source {
        AddressSource::Text(text) => {
            if text.trim().is_empty() {
                return Err(EntityError::MissingAddress);
            }
            collect_addresses(text, &mut seen, &mut entities);
        }
        AddressSource::Column { batch, column } => {
            let col = batch
                .column_by_name(column)
                .ok_or_else(|| EntityError::MissingColumn(column.to_string()))?;
            let values = col
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| EntityError::NotAStringColumn(column.to_string()))?;
            for row in 0..values.len() {
                if !values.is_null(row) {
                    collect_addresses(values.value(row), &mut seen, &mut entities);
                }
            }
        }
    }

    if let Some(geo) = geo {
        for entity in &mut entities {
            geo.lookup(entity).await.map_err(EntityError::Geo)?;
        }
    }

    Ok(entities)
}

/// Split a delimited cell and append entities for unseen addresses.
fn collect_addresses(text: &str, seen: &mut HashSet<String>, entities: &mut Vec<IpEntity>) {
    for part in text.split(|c: char| c == ',' || c.is_whitespace()) {
        let addr = part.trim();
        if !addr.is_empty() && seen.insert(addr.to_string()) {
            entities.push(IpEntity::new(addr));
        }
    }
}
