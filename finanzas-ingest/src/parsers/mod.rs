//! Schema-specific CSV parsers producing canonical transactions

pub mod bank_export;
pub mod native;

use chrono::NaiveDate;
use csv::StringRecord;
use finanzas_core::Transaction;
use tracing::{debug, warn};

use crate::error::{IngestError, Result};
use crate::normalize::{parse_flag, AmountParser};
use crate::types::SchemaKind;

/// Header names of the four required fields for one schema
pub(crate) struct RequiredNames {
    pub concept: &'static str,
    pub date: &'static str,
    pub amount: &'static str,
    pub balance: &'static str,
}

/// Column positions resolved from a header row
pub(crate) struct Columns {
    concept: usize,
    date: usize,
    amount: usize,
    balance: usize,
    category: Option<usize>,
    subcategory: Option<usize>,
    subscription: Option<usize>,
    hidden: Option<usize>,
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().trim_matches('"').eq_ignore_ascii_case(name))
}

impl Columns {
    pub(crate) fn resolve(schema: SchemaKind, headers: &StringRecord, names: &RequiredNames) -> Result<Self> {
        let required = |column: &'static str| {
            find_column(headers, column).ok_or(IngestError::MissingColumn { schema, column })
        };
        Ok(Self {
            concept: required(names.concept)?,
            date: required(names.date)?,
            amount: required(names.amount)?,
            balance: required(names.balance)?,
            category: find_column(headers, "Category"),
            subcategory: find_column(headers, "Subcategory"),
            subscription: find_column(headers, "Subscription"),
            hidden: find_column(headers, "Hidden"),
        })
    }
}

/// Everything needed to turn raw records of one schema into transactions
pub(crate) struct RowReader<'a> {
    pub names: &'a RequiredNames,
    pub columns: Columns,
    pub amounts: AmountParser,
    pub parse_date: fn(&str) -> Option<NaiveDate>,
    /// Lines consumed before the CSV reader started (preamble)
    pub line_offset: u64,
}

fn field<'r>(record: &'r StringRecord, idx: Option<usize>) -> &'r str {
    idx.and_then(|i| record.get(i)).map(str::trim).unwrap_or("")
}

impl RowReader<'_> {
    /// Read every record, dropping rows with a blank required field.
    /// Returns the transactions and the number of dropped rows.
    pub(crate) fn read<R: std::io::Read>(&self, rdr: &mut csv::Reader<R>) -> Result<(Vec<Transaction>, usize)> {
        let mut out = Vec::new();
        let mut dropped = 0;

        for result in rdr.records() {
            let record = result?;
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            let line = record.position().map(|p| p.line()).unwrap_or(0) + self.line_offset;

            let c = &self.columns;
            let concept = field(&record, Some(c.concept));
            let date_raw = field(&record, Some(c.date));
            let amount_raw = field(&record, Some(c.amount));
            let balance_raw = field(&record, Some(c.balance));

            if concept.is_empty() || date_raw.is_empty() || amount_raw.is_empty() || balance_raw.is_empty() {
                debug!(line, "dropping row with a blank required field");
                dropped += 1;
                continue;
            }

            let date = (self.parse_date)(date_raw).ok_or_else(|| IngestError::InvalidDate {
                line,
                value: date_raw.to_string(),
            })?;
            let amount = self.number(line, self.names.amount, amount_raw)?;
            let balance = self.number(line, self.names.balance, balance_raw)?;

            let txn = Transaction::new(date, concept, amount, balance)
                .with_category(field(&record, c.category), field(&record, c.subcategory))
                .with_subscription(flag(&record, c.subscription, line, "Subscription"))
                .with_hidden(flag(&record, c.hidden, line, "Hidden"));
            out.push(txn);
        }

        Ok((out, dropped))
    }

    fn number(&self, line: u64, column: &'static str, raw: &str) -> Result<f64> {
        self.amounts.parse(raw).ok_or_else(|| IngestError::InvalidNumber {
            line,
            column,
            value: raw.to_string(),
        })
    }
}

fn flag(record: &StringRecord, idx: Option<usize>, line: u64, column: &str) -> bool {
    let raw = field(record, idx);
    parse_flag(raw).unwrap_or_else(|| {
        warn!(line, column, value = raw, "unrecognised boolean, treating as false");
        false
    })
}
