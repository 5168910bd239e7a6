//! Batch categorization run over the uncategorized rows of a dataset.
//!
//! The set of rows to process is fixed when the run starts. Rows are sent to
//! the service in fixed-size batches; the cancellation flag is only checked
//! between batches. A failing batch stops the run but everything applied so
//! far stays applied.

use std::sync::atomic::{AtomicBool, Ordering};

use finanzas_core::Dataset;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::CategorizationError;
use crate::service::{CategorizationItem, CategorizationRequest, CategorizationService};

pub const DEFAULT_BATCH_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub batch_size: usize,
    pub restrict_to_vocabulary: bool,
    /// Also categorize every other row with the same concept
    pub apply_to_similar: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            restrict_to_vocabulary: true,
            apply_to_similar: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedSuggestion {
    pub index: usize,
    pub concept: String,
    pub amount: f64,
    pub category: String,
    pub subcategory: String,
    /// Rows updated, including `index` itself
    pub rows_updated: usize,
}

#[derive(Debug)]
pub enum RunStatus {
    Completed,
    Cancelled,
    Failed(CategorizationError),
}

#[derive(Debug)]
pub struct CategorizationReport {
    pub total_uncategorized: usize,
    /// Snapshot rows sent to the service in successful batches
    pub processed: usize,
    pub applied: Vec<AppliedSuggestion>,
    pub status: RunStatus,
}

impl CategorizationReport {
    pub fn is_completed(&self) -> bool {
        matches!(self.status, RunStatus::Completed)
    }
}

pub fn categorize_uncategorized(
    dataset: &mut Dataset,
    service: &dyn CategorizationService,
    options: &BatchOptions,
    cancel: &AtomicBool,
) -> CategorizationReport {
    let snapshot = dataset.uncategorized_indices();
    let total = snapshot.len();
    let batch_size = options.batch_size.max(1);
    info!(
        service = service.name(),
        uncategorized = total,
        batch_size,
        "starting categorization run"
    );

    let mut report = CategorizationReport {
        total_uncategorized: total,
        processed: 0,
        applied: Vec::new(),
        status: RunStatus::Completed,
    };

    for (n, chunk) in snapshot.chunks(batch_size).enumerate() {
        if cancel.load(Ordering::SeqCst) {
            warn!(processed = report.processed, total, "categorization cancelled");
            report.status = RunStatus::Cancelled;
            break;
        }

        let items: Vec<CategorizationItem> = chunk
            .iter()
            .filter_map(|&i| dataset.get(i))
            .map(CategorizationItem::from)
            .collect();
        debug!(batch = n + 1, size = items.len(), "sending batch");

        let result = {
            let request = CategorizationRequest {
                items,
                vocabulary: dataset.vocabulary(),
                restrict_to_vocabulary: options.restrict_to_vocabulary,
            };
            service.suggest(&request).and_then(|suggestions| {
                if suggestions.len() == request.len() {
                    Ok(suggestions)
                } else {
                    Err(CategorizationError::CountMismatch {
                        expected: request.len(),
                        got: suggestions.len(),
                    })
                }
            })
        };

        let suggestions = match result {
            Ok(s) => s,
            Err(e) => {
                warn!(batch = n + 1, error = %e, "categorization batch failed, stopping");
                report.status = RunStatus::Failed(e);
                break;
            }
        };

        for (&index, suggestion) in chunk.iter().zip(suggestions) {
            if suggestion.is_empty() {
                debug!(index, "empty suggestion, row left uncategorized");
                continue;
            }
            let Some(txn) = dataset.get(index) else {
                continue;
            };
            let concept = txn.concept.clone();
            let amount = txn.amount;

            let rows_updated = if options.apply_to_similar {
                dataset.apply_to_concept(&concept, &suggestion.category, &suggestion.subcategory)
            } else if dataset
                .set_category(index, &suggestion.category, &suggestion.subcategory)
                .is_ok()
            {
                1
            } else {
                0
            };

            report.applied.push(AppliedSuggestion {
                index,
                concept,
                amount,
                category: suggestion.category,
                subcategory: suggestion.subcategory,
                rows_updated,
            });
        }
        report.processed += chunk.len();
        info!(processed = report.processed, total, "categorization progress");
    }

    if report.is_completed() {
        info!(applied = report.applied.len(), total, "categorization run completed");
    }
    report
}
