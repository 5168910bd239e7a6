//! finanzas-core: transaction dataset engine.
//!
//! Owns the canonical transaction set and everything computed from it:
//! deduplicated merging of imports, filtered views, KPIs and category
//! averages, and the balance trend / projection.

pub mod aggregate;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod merge;
pub mod time;
pub mod transaction;
pub mod trend;

pub use aggregate::{breakdown, kpis, monthly_averages, CategoryAverage, CategoryTotal, Flow, Kpis};
pub use dataset::{Dataset, Vocabulary};
pub use error::{CoreError, Result};
pub use filter::{month_starts, FilterState, YearMonth};
pub use merge::{merge, MergeReport};
pub use transaction::Transaction;
pub use trend::{
    trend_series, Projection, ProjectionRate, ReachableProjection, TrendAnalysis, TrendPoint,
    UnreachableReason,
};
