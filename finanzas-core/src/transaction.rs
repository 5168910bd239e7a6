//! Canonical transaction record shared by every stage of the pipeline

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of an account statement after normalization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Booking date (calendar-day granularity)
    pub date: NaiveDate,
    /// Free-text description as reported by the bank
    pub concept: String,
    /// Empty until categorized
    pub category: String,
    /// Empty until categorized
    pub subcategory: String,
    /// Positive = income, negative = expense
    pub amount: f64,
    /// Running balance reported by the source, never recomputed
    pub balance: f64,
    /// Excluded from filtered views unless explicitly requested
    #[serde(default)]
    pub hidden: bool,
    /// Recurring charge marker carried by the native schema
    #[serde(default)]
    pub subscription: bool,
}

impl Transaction {
    /// Create an uncategorized, visible transaction
    pub fn new(date: NaiveDate, concept: impl Into<String>, amount: f64, balance: f64) -> Self {
        Self {
            date,
            concept: concept.into(),
            category: String::new(),
            subcategory: String::new(),
            amount,
            balance,
            hidden: false,
            subscription: false,
        }
    }

    /// Builder-style category assignment
    pub fn with_category(mut self, category: impl Into<String>, subcategory: impl Into<String>) -> Self {
        self.category = category.into();
        self.subcategory = subcategory.into();
        self
    }

    pub fn with_subscription(mut self, subscription: bool) -> Self {
        self.subscription = subscription;
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Returns true if this is an expense (negative amount)
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    /// Returns true if this is income (positive amount)
    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    /// A row counts as uncategorized while its category is blank
    pub fn is_uncategorized(&self) -> bool {
        self.category.trim().is_empty()
    }

    /// Key used to recognise a row that was already imported:
    /// the concept followed by the ISO date.
    pub fn dedup_key(&self) -> String {
        format!("{}{}", self.concept, self.date.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_transaction_creation() {
        let t = Transaction::new(day(2024, 3, 1), "Cafe", -5.30, 1234.56);
        assert!(t.is_expense());
        assert!(!t.is_income());
        assert!(t.is_uncategorized());
        assert!(!t.hidden);
        assert!(!t.subscription);
    }

    #[test]
    fn test_zero_amount_is_neither() {
        let t = Transaction::new(day(2024, 3, 1), "Adjustment", 0.0, 10.0);
        assert!(!t.is_expense());
        assert!(!t.is_income());
    }

    #[test]
    fn test_dedup_key_uses_day_granularity() {
        let t = Transaction::new(day(2024, 3, 1), "Cafe", -5.30, 100.0);
        assert_eq!(t.dedup_key(), "Cafe2024-03-01");
    }

    #[test]
    fn test_with_category_marks_categorized() {
        let t = Transaction::new(day(2024, 3, 1), "Mercadona", -40.0, 100.0)
            .with_category("Food", "Supermarket");
        assert!(!t.is_uncategorized());
        assert_eq!(t.subcategory, "Supermarket");
    }

    #[test]
    fn test_serde_defaults_flags() {
        let json = r#"{"date":"2024-03-01","concept":"Cafe","category":"","subcategory":"","amount":-1.0,"balance":2.0}"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert!(!t.hidden);
        assert!(!t.subscription);
    }
}
