//! The categorization service seam.
//!
//! A service gets a batch of `{concept, amount}` items together with the
//! dataset's current vocabulary and returns one suggestion per item, in the
//! same order. Partial answers do not exist: either every item gets a
//! suggestion or the call fails.

use finanzas_core::{Transaction, Vocabulary};
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorizationItem {
    pub concept: String,
    pub amount: f64,
}

impl From<&Transaction> for CategorizationItem {
    fn from(t: &Transaction) -> Self {
        Self {
            concept: t.concept.clone(),
            amount: t.amount,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategorizationRequest<'a> {
    pub items: Vec<CategorizationItem>,
    pub vocabulary: &'a Vocabulary,
    /// Only suggest pairs already present in `vocabulary`
    pub restrict_to_vocabulary: bool,
}

impl CategorizationRequest<'_> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category: String,
    pub subcategory: String,
}

impl Suggestion {
    pub fn new(category: impl Into<String>, subcategory: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.into(),
        }
    }

    /// No category at all; applying it would leave the row uncategorized
    pub fn is_empty(&self) -> bool {
        self.category.trim().is_empty()
    }

    pub fn in_vocabulary(&self, vocabulary: &Vocabulary) -> bool {
        let sub = self.subcategory.trim();
        vocabulary
            .get(self.category.trim())
            .is_some_and(|subs| subs.contains(sub) || (sub.is_empty() && subs.is_empty()))
    }
}

pub trait CategorizationService {
    /// Backend name, for logs
    fn name(&self) -> &str;

    fn suggest(&self, request: &CategorizationRequest<'_>) -> Result<Vec<Suggestion>>;
}
