//! KPI and per-category aggregation over an already filtered row set.
//!
//! Nothing here filters by date or hidden status; callers pass the view they
//! want summarised (usually `Dataset::filter`).

use std::collections::{BTreeMap, HashSet};

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

/// Headline totals for a view
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    /// Sum of negative amounts (always <= 0)
    pub total_expenses: f64,
    /// Sum of positive amounts (always >= 0)
    pub total_income: f64,
}

impl Kpis {
    pub fn net(&self) -> f64 {
        self.total_income + self.total_expenses
    }
}

/// Average monthly spend of one (category, subcategory) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAverage {
    pub category: String,
    pub subcategory: String,
    /// Positive number: spend per month
    pub monthly_average: f64,
}

/// Which side of the ledger a breakdown covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flow {
    Income,
    Expense,
}

impl Flow {
    fn includes(self, txn: &Transaction) -> bool {
        match self {
            Flow::Income => txn.is_income(),
            Flow::Expense => txn.is_expense(),
        }
    }
}

/// Total magnitude of one (category, subcategory) pair within a flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub subcategory: String,
    /// Always positive; expenses are reported by magnitude
    pub total: f64,
    pub count: usize,
}

/// Total expenses and income. Zero amounts count towards neither.
pub fn kpis<'a>(rows: impl IntoIterator<Item = &'a Transaction>) -> Kpis {
    rows.into_iter().fold(Kpis::default(), |mut acc, txn| {
        if txn.is_expense() {
            acc.total_expenses += txn.amount;
        } else if txn.is_income() {
            acc.total_income += txn.amount;
        }
        acc
    })
}

/// Average monthly spend per (category, subcategory).
///
/// The month count is the number of distinct year-months present in the whole
/// row set (income rows included), never less than one. Pairs without any
/// expense are left out rather than reported as zero.
pub fn monthly_averages<'a>(rows: impl IntoIterator<Item = &'a Transaction>) -> Vec<CategoryAverage> {
    let mut months: HashSet<(i32, u32)> = HashSet::new();
    let mut spend: BTreeMap<(String, String), f64> = BTreeMap::new();

    for txn in rows {
        months.insert((txn.date.year(), txn.date.month()));
        if txn.is_expense() {
            *spend
                .entry((txn.category.clone(), txn.subcategory.clone()))
                .or_insert(0.0) += txn.amount;
        }
    }

    let num_months = months.len().max(1) as f64;

    spend
        .into_iter()
        .map(|((category, subcategory), sum)| CategoryAverage {
            category,
            subcategory,
            monthly_average: sum / -num_months,
        })
        .collect()
}

/// Per-category totals for one flow, largest first
pub fn breakdown<'a>(rows: impl IntoIterator<Item = &'a Transaction>, flow: Flow) -> Vec<CategoryTotal> {
    let mut groups: BTreeMap<(String, String), (f64, usize)> = BTreeMap::new();

    for txn in rows.into_iter().filter(|t| flow.includes(t)) {
        let entry = groups
            .entry((txn.category.clone(), txn.subcategory.clone()))
            .or_insert((0.0, 0));
        entry.0 += txn.amount.abs();
        entry.1 += 1;
    }

    let mut totals: Vec<CategoryTotal> = groups
        .into_iter()
        .map(|((category, subcategory), (total, count))| CategoryTotal {
            category,
            subcategory,
            total,
            count,
        })
        .collect();

    // BTreeMap order breaks ties, so the result is deterministic
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(y: i32, m: u32, d: u32, cat: &str, sub: &str, amount: f64) -> Transaction {
        Transaction::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), format!("{cat}-{sub}"), amount, 0.0)
            .with_category(cat, sub)
    }

    #[test]
    fn test_kpis_split_by_sign() {
        let rows = vec![
            row(2024, 1, 1, "Income", "Salary", 2000.0),
            row(2024, 1, 2, "Food", "Supermarket", -120.5),
            row(2024, 1, 3, "Food", "Restaurants", -30.0),
            row(2024, 1, 4, "Other", "Adjustment", 0.0),
        ];
        let k = kpis(&rows);
        assert_eq!(k.total_income, 2000.0);
        assert_eq!(k.total_expenses, -150.5);
        assert_eq!(k.net(), 1849.5);
    }

    #[test]
    fn test_kpis_sum_matches_nonzero_amounts() {
        let amounts = [12.5, -3.25, 0.0, -100.0, 7.75, 0.0, -0.5];
        let rows: Vec<_> = amounts
            .iter()
            .enumerate()
            .map(|(i, a)| row(2024, 2, i as u32 + 1, "X", "Y", *a))
            .collect();
        let k = kpis(&rows);
        let nonzero: f64 = amounts.iter().filter(|a| **a != 0.0).sum();
        assert!((k.total_expenses + k.total_income - nonzero).abs() < 1e-9);
        assert!(k.total_expenses <= 0.0);
        assert!(k.total_income >= 0.0);
    }

    #[test]
    fn test_kpis_empty() {
        let rows: Vec<Transaction> = Vec::new();
        assert_eq!(kpis(&rows), Kpis::default());
    }

    #[test]
    fn test_single_month_average_equals_sum() {
        let rows = vec![
            row(2024, 3, 1, "Food", "Supermarket", -40.0),
            row(2024, 3, 15, "Food", "Supermarket", -60.0),
            row(2024, 3, 20, "Transport", "Public", -10.0),
        ];
        let avgs = monthly_averages(&rows);
        assert_eq!(avgs.len(), 2);
        assert_eq!(avgs[0].category, "Food");
        assert_eq!(avgs[0].monthly_average, 100.0);
        assert_eq!(avgs[1].monthly_average, 10.0);
    }

    #[test]
    fn test_average_divides_by_distinct_months() {
        let rows = vec![
            row(2024, 1, 5, "Food", "Supermarket", -90.0),
            row(2024, 2, 5, "Income", "Salary", 1000.0),
            row(2024, 3, 5, "Food", "Supermarket", -60.0),
        ];
        let avgs = monthly_averages(&rows);
        // February only has income but still counts as a month
        assert_eq!(avgs.len(), 1);
        assert_eq!(avgs[0].monthly_average, 50.0);
    }

    #[test]
    fn test_income_only_pairs_omitted() {
        let rows = vec![row(2024, 1, 5, "Income", "Salary", 1000.0)];
        assert!(monthly_averages(&rows).is_empty());
    }

    #[test]
    fn test_breakdown_expense_magnitudes() {
        let rows = vec![
            row(2024, 1, 1, "Food", "Supermarket", -40.0),
            row(2024, 1, 2, "Housing", "Rent", -700.0),
            row(2024, 1, 3, "Food", "Supermarket", -10.0),
            row(2024, 1, 4, "Income", "Salary", 1500.0),
        ];
        let out = breakdown(&rows, Flow::Expense);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].category, "Housing");
        assert_eq!(out[0].total, 700.0);
        assert_eq!(out[1].total, 50.0);
        assert_eq!(out[1].count, 2);

        let income = breakdown(&rows, Flow::Income);
        assert_eq!(income.len(), 1);
        assert_eq!(income[0].total, 1500.0);
    }
}
