//! Import errors. Any of these aborts the whole import.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::SchemaKind;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to access {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("{schema} file is missing the '{column}' column")]
    MissingColumn { schema: SchemaKind, column: &'static str },

    #[error("line {line}: invalid date '{value}'")]
    InvalidDate { line: u64, value: String },

    #[error("line {line}: invalid number '{value}' in column '{column}'")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;
