//! The dataset store: sole owner and mutator of the session's transactions.
//!
//! Rows are addressed by insertion index, which never changes because the
//! store only grows by appending merged batches.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{CoreError, Result};
use crate::filter::FilterState;
use crate::merge::{merge, MergeReport};
use crate::transaction::Transaction;

/// `category -> subcategories` seen in categorized rows
pub type Vocabulary = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    transactions: Vec<Transaction>,
    vocabulary: Vocabulary,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let mut ds = Self {
            transactions,
            vocabulary: Vocabulary::new(),
        };
        ds.refresh_vocabulary();
        ds
    }

    pub fn has_data(&self) -> bool {
        !self.transactions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, index: usize) -> Option<&Transaction> {
        self.transactions.get(index)
    }

    /// Drop everything, back to an unloaded session
    pub fn reset(&mut self) {
        self.transactions.clear();
        self.vocabulary.clear();
    }

    /// Merge a parsed batch, skipping rows already present
    pub fn import(&mut self, batch: Vec<Transaction>) -> MergeReport {
        let existing = std::mem::take(&mut self.transactions);
        let (merged, report) = merge(existing, batch);
        self.transactions = merged;
        self.refresh_vocabulary();
        info!(
            accepted = report.accepted,
            duplicates = report.duplicates,
            total = self.transactions.len(),
            "merged import batch"
        );
        report
    }

    /// Rows inside the filter, in insertion order
    pub fn filter(&self, filter: &FilterState) -> Result<Vec<&Transaction>> {
        if !self.has_data() {
            return Err(CoreError::EmptyDataset);
        }
        Ok(self.transactions.iter().filter(|t| filter.contains(t)).collect())
    }

    /// Oldest and newest dates in the dataset (hidden rows included)
    pub fn date_range(&self) -> Result<(NaiveDate, NaiveDate)> {
        let min = self.transactions.iter().map(|t| t.date).min();
        let max = self.transactions.iter().map(|t| t.date).max();
        match (min, max) {
            (Some(min), Some(max)) => Ok((min, max)),
            _ => Err(CoreError::EmptyDataset),
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.keys().map(String::as_str)
    }

    /// Categorize a single row
    pub fn set_category(&mut self, index: usize, category: &str, subcategory: &str) -> Result<()> {
        let len = self.transactions.len();
        let txn = self
            .transactions
            .get_mut(index)
            .ok_or(CoreError::IndexOutOfRange { index, len })?;
        txn.category = category.to_string();
        txn.subcategory = subcategory.to_string();
        self.refresh_vocabulary();
        Ok(())
    }

    /// Categorize every row whose concept matches exactly. Returns how many
    /// rows were updated; all of them change in this one call.
    pub fn apply_to_concept(&mut self, concept: &str, category: &str, subcategory: &str) -> usize {
        let mut updated = 0;
        for txn in self.transactions.iter_mut().filter(|t| t.concept == concept) {
            txn.category = category.to_string();
            txn.subcategory = subcategory.to_string();
            updated += 1;
        }
        if updated > 0 {
            self.refresh_vocabulary();
        }
        debug!(concept, category, subcategory, updated, "applied category to concept");
        updated
    }

    pub fn hide(&mut self, index: usize) -> Result<()> {
        self.set_hidden(index, true)
    }

    pub fn unhide(&mut self, index: usize) -> Result<()> {
        self.set_hidden(index, false)
    }

    pub fn is_hidden(&self, index: usize) -> bool {
        self.transactions.get(index).is_some_and(|t| t.hidden)
    }

    fn set_hidden(&mut self, index: usize, hidden: bool) -> Result<()> {
        let len = self.transactions.len();
        let txn = self
            .transactions
            .get_mut(index)
            .ok_or(CoreError::IndexOutOfRange { index, len })?;
        txn.hidden = hidden;
        Ok(())
    }

    /// Indices of rows still waiting for a category
    pub fn uncategorized_indices(&self) -> Vec<usize> {
        self.transactions
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_uncategorized())
            .map(|(i, _)| i)
            .collect()
    }

    /// Case-insensitive substring search over concept, category and subcategory
    pub fn search(&self, term: &str) -> Vec<(usize, &Transaction)> {
        let needle = term.trim().to_lowercase();
        self.transactions
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                needle.is_empty()
                    || t.concept.to_lowercase().contains(&needle)
                    || t.category.to_lowercase().contains(&needle)
                    || t.subcategory.to_lowercase().contains(&needle)
            })
            .collect()
    }

    fn refresh_vocabulary(&mut self) {
        let mut vocab = Vocabulary::new();
        for txn in &self.transactions {
            let category = txn.category.trim();
            if category.is_empty() {
                continue;
            }
            let subs = vocab.entry(category.to_string()).or_default();
            let sub = txn.subcategory.trim();
            if !sub.is_empty() {
                subs.insert(sub.to_string());
            }
        }
        self.vocabulary = vocab;
    }
}
