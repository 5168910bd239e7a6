//! finanzas-ai: categorization services and the batch runner that applies
//! their suggestions to a dataset.

pub mod batch;
pub mod category_rules;
pub mod error;
pub mod mock;
pub mod openai;
pub mod parsing;
pub mod service;

pub use batch::{categorize_uncategorized, AppliedSuggestion, BatchOptions, CategorizationReport, RunStatus};
pub use category_rules::{categorize, RuleCategorizer};
pub use error::{CategorizationError, Result};
pub use mock::MockCategorizer;
pub use openai::OpenAiCategorizer;
pub use service::{CategorizationItem, CategorizationRequest, CategorizationService, Suggestion};
