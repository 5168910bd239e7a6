//! Error types for the dataset engine

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Filtering, aggregation over the store and projection need loaded data.
    /// Callers are expected to check `Dataset::has_data` first.
    #[error("no transactions loaded; import a statement first")]
    EmptyDataset,

    #[error("transaction index {index} out of range (dataset has {len} rows)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("invalid month {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },
}

pub type Result<T> = std::result::Result<T, CoreError>;
