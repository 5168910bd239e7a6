//! View descriptors: date range plus hidden-row visibility

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{CoreError, Result};
use crate::transaction::Transaction;

/// Transient filter; rebuilt whenever the user changes the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Inclusive
    pub first_day: NaiveDate,
    /// Inclusive
    pub last_day: NaiveDate,
    pub show_hidden: bool,
}

impl FilterState {
    /// Bounds given in the wrong order are swapped
    pub fn new(first_day: NaiveDate, last_day: NaiveDate, show_hidden: bool) -> Self {
        let (first_day, last_day) = if first_day <= last_day {
            (first_day, last_day)
        } else {
            (last_day, first_day)
        };
        Self {
            first_day,
            last_day,
            show_hidden,
        }
    }

    /// Everything the dataset holds
    pub fn all(dataset: &Dataset, show_hidden: bool) -> Result<Self> {
        let (min, max) = dataset.date_range()?;
        Ok(Self::new(min, max, show_hidden))
    }

    /// From the first day of `from` to the last day of `to`, but never past
    /// `max_date` (the newest row of the dataset).
    pub fn for_months(from: YearMonth, to: YearMonth, max_date: NaiveDate, show_hidden: bool) -> Result<Self> {
        let (from, to) = if from <= to { (from, to) } else { (to, from) };
        let first_day = from.first_day()?;
        let last_day = to.last_day()?.min(max_date);
        Ok(Self::new(first_day, last_day, show_hidden))
    }

    pub fn contains(&self, txn: &Transaction) -> bool {
        txn.date >= self.first_day && txn.date <= self.last_day && (self.show_hidden || !txn.hidden)
    }
}

/// Calendar month, parsed from `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::InvalidMonth { year, month });
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or(CoreError::InvalidMonth {
            year: self.year,
            month: self.month,
        })
    }

    pub fn last_day(&self) -> Result<NaiveDate> {
        self.first_day()?
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or(CoreError::InvalidMonth {
                year: self.year,
                month: self.month,
            })
    }
}

impl FromStr for YearMonth {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CoreError::InvalidMonth { year: 0, month: 0 };
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// First day of every month touched by `[min, max]`, oldest first
pub fn month_starts(min: NaiveDate, max: NaiveDate) -> Vec<NaiveDate> {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    let mut out = Vec::new();
    let mut cursor = min.with_day(1);
    while let Some(start) = cursor {
        if start > max {
            break;
        }
        out.push(start);
        cursor = start.checked_add_months(Months::new(1));
    }
    out
}
