//! WHOIS enrichment over Arrow record batches

use crate::classify::ClassifyError;
use crate::whois::{WhoisInfo, WhoisLookup};
use arrow::array::{Array, ArrayRef, StringArray, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Default name for the ASN description output column
pub const DEFAULT_ASN_COLUMN: &str = "AsnDescription";
/// Default name for the raw WHOIS record output column
pub const DEFAULT_WHOIS_COLUMN: &str = "WhoIsData";

/// Errors from table enrichment
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    /// The named address column does not exist in the table
    #[error("column {0:?} not found in table")]
    MissingColumn(String),

    /// The named address column is not a string column
    #[error("column {0:?} is not a string column")]
    NotAStringColumn(String),

    /// Invalid address argument
    #[error(transparent)]
    Address(#[from] ClassifyError),

    /// Failed to assemble the output batch
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Failed to serialize a WHOIS record for the raw-record column
    #[error("failed to serialize whois record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Output column shape for [`TableEnricher::enrich`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichMode {
    /// One summary column with the ASN description
    Summary,
    /// Summary column plus the raw record serialized as JSON
    SummaryAndRecord,
    /// One column per distinct WHOIS record field across all rows
    Expand,
}

/// Options controlling enrichment output columns
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Column shape to produce
    pub mode: EnrichMode,
    /// Name of the summary column (`Summary`/`SummaryAndRecord` modes)
    pub asn_col: String,
    /// Name of the raw-record column (`SummaryAndRecord` mode)
    pub whois_col: String,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            mode: EnrichMode::Summary,
            asn_col: DEFAULT_ASN_COLUMN.to_string(),
            whois_col: DEFAULT_WHOIS_COLUMN.to_string(),
        }
    }
}

impl EnrichOptions {
    /// Options for the given mode with default column names
    pub fn with_mode(mode: EnrichMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

/// Applies WHOIS resolution across an address column of a table.
///
/// The input batch is never mutated; a new batch with the appended
/// columns is returned. Output column names that collide with existing
/// columns replace them. Row count and order are preserved, and one
/// unresolvable or null address never aborts the batch.
pub struct TableEnricher {
    whois: Arc<WhoisLookup>,
}

impl TableEnricher {
    /// Create an enricher backed by the given WHOIS service
    pub fn new(whois: Arc<WhoisLookup>) -> Self {
        Self { whois }
    }

    /// Enrich `batch` by resolving each value of `ip_column`.
    ///
    /// Null and empty cells produce an empty summary and record.
    pub async fn enrich(
        &self,
        batch: &RecordBatch,
        ip_column: &str,
        options: &EnrichOptions,
    ) -> Result<RecordBatch, EnrichError> {
        let column = batch
            .column_by_name(ip_column)
            .ok_or_else(|| EnrichError::MissingColumn(ip_column.to_string()))?;
        let addresses = column
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| EnrichError::NotAStringColumn(ip_column.to_string()))?;

        let mut results: Vec<WhoisInfo> = Vec::with_capacity(addresses.len());
        for row in 0..addresses.len() {
            let value = if addresses.is_null(row) {
                ""
            } else {
                addresses.value(row)
            };
            if value.trim().is_empty() {
                results.push(WhoisInfo::summary_only(""));
            } else {
                results.push(self.whois.lookup(value).await?);
            }
        }

        let mut fields: Vec<Field> = batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.as_ref().clone())
            .collect();
        let mut arrays: Vec<ArrayRef> = batch.columns().to_vec();

        match options.mode {
            EnrichMode::Summary => {
                let summaries = summary_array(&results);
                replace_or_append(&mut fields, &mut arrays, &options.asn_col, summaries);
            }
            EnrichMode::SummaryAndRecord => {
                let summaries = summary_array(&results);
                replace_or_append(&mut fields, &mut arrays, &options.asn_col, summaries);

                let mut records = StringBuilder::with_capacity(results.len(), results.len() * 64);
                for info in &results {
                    records.append_value(serde_json::to_string(&info.record)?);
                }
                replace_or_append(
                    &mut fields,
                    &mut arrays,
                    &options.whois_col,
                    Arc::new(records.finish()),
                );
            }
            EnrichMode::Expand => {
                // Union of field names over all rows, sorted for a
                // deterministic schema
                let names: BTreeSet<&str> = results
                    .iter()
                    .flat_map(|info| info.record.field_names())
                    .collect();
                for name in names {
                    let mut builder = StringBuilder::with_capacity(results.len(), results.len() * 16);
                    for info in &results {
                        builder.append_option(info.record.get(name));
                    }
                    let array: ArrayRef = Arc::new(builder.finish());
                    replace_or_append(&mut fields, &mut arrays, name, array);
                }
            }
        }

        Ok(RecordBatch::try_new(
            Arc::new(Schema::new(fields)),
            arrays,
        )?)
    }
}

fn summary_array(results: &[WhoisInfo]) -> ArrayRef {
    let mut builder = StringBuilder::with_capacity(results.len(), results.len() * 24);
    for info in results {
        builder.append_value(&info.asn_description);
    }
    Arc::new(builder.finish())
}

/// Overwrite a column of the same name, or append a new one.
fn replace_or_append(
    fields: &mut Vec<Field>,
    arrays: &mut Vec<ArrayRef>,
    name: &str,
    array: ArrayRef,
) {
    let field = Field::new(name, DataType::Utf8, true);
    if let Some(idx) = fields.iter().position(|f| f.name() == name) {
        fields[idx] = field;
        arrays[idx] = array;
    } else {
        fields.push(field);
        arrays.push(array);
    }
}
