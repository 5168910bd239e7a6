//! Mock categorizer for tests

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{CategorizationError, Result};
use crate::service::{CategorizationRequest, CategorizationService, Suggestion};

/// Answers every item with the same suggestion. Can be told to fail on the
/// N-th call (1-based) to exercise the runner's failure path.
#[derive(Debug, Default)]
pub struct MockCategorizer {
    suggestion: Suggestion,
    fail_on_call: Option<usize>,
    calls: AtomicUsize,
}

impl MockCategorizer {
    pub fn new(category: &str, subcategory: &str) -> Self {
        Self {
            suggestion: Suggestion::new(category, subcategory),
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CategorizationService for MockCategorizer {
    fn name(&self) -> &str {
        "mock"
    }

    fn suggest(&self, request: &CategorizationRequest<'_>) -> Result<Vec<Suggestion>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(CategorizationError::Status {
                status: 500,
                body: format!("mock failure on call {call}"),
            });
        }
        Ok(vec![self.suggestion.clone(); request.len()])
    }
}
