//! Tabular enrichment
//!
//! Applies WHOIS resolution across an address column of an Arrow
//! `RecordBatch`, appending summary and/or record columns.

pub mod table;

pub use table::{EnrichError, EnrichMode, EnrichOptions, TableEnricher};
