//! finanzas-ingest: statement ingestion (format detection + schema parsers)
//! and native CSV export.

pub mod detect;
pub mod error;
pub mod normalize;
pub mod parsers;
pub mod types;
pub mod writer;

use std::path::Path;

use tracing::info;

pub use detect::detect_format;
pub use error::{IngestError, Result};
pub use normalize::{parse_amount, AmountParser};
pub use parsers::bank_export::parse_bank_export_csv;
pub use parsers::native::parse_native_csv;
pub use types::{NumberFormat, ParsedBatch, SchemaKind};
pub use writer::{write_native_csv, write_native_file};

/// Detect the format of raw file content and parse it
pub fn parse_bytes(bytes: &[u8]) -> Result<ParsedBatch> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let content = String::from_utf8_lossy(bytes);
    parse_str(&content)
}

/// Detect the format of already decoded content and parse it
pub fn parse_str(content: &str) -> Result<ParsedBatch> {
    let batch = match detect_format(content) {
        SchemaKind::BankExport => parse_bank_export_csv(content)?,
        SchemaKind::Native => parse_native_csv(content)?,
    };
    info!(
        schema = %batch.schema,
        rows = batch.transactions.len(),
        dropped = batch.dropped,
        "parsed statement"
    );
    Ok(batch)
}

pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedBatch> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| IngestError::File {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bytes(&bytes)
}
