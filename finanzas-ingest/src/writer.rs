//! Native CSV export, readable again by `parse_native_csv`

use std::fs::File;
use std::io::Write;
use std::path::Path;

use finanzas_core::Transaction;
use serde::Serialize;

use crate::error::{IngestError, Result};

const NATIVE_HEADER: [&str; 8] = [
    "Date",
    "Concept",
    "Category",
    "Subcategory",
    "Amount",
    "Balance",
    "Subscription",
    "Hidden",
];

#[derive(Serialize)]
struct NativeRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Concept")]
    concept: &'a str,
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Subcategory")]
    subcategory: &'a str,
    #[serde(rename = "Amount")]
    amount: f64,
    #[serde(rename = "Balance")]
    balance: f64,
    #[serde(rename = "Subscription")]
    subscription: bool,
    #[serde(rename = "Hidden")]
    hidden: bool,
}

impl<'a> From<&'a Transaction> for NativeRow<'a> {
    fn from(t: &'a Transaction) -> Self {
        Self {
            date: t.date.format("%Y-%m-%d").to_string(),
            concept: &t.concept,
            category: &t.category,
            subcategory: &t.subcategory,
            amount: t.amount,
            balance: t.balance,
            subscription: t.subscription,
            hidden: t.hidden,
        }
    }
}

pub fn write_native_csv<W: Write>(writer: W, transactions: &[Transaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    // serde rows only emit the header along with the first record
    if transactions.is_empty() {
        wtr.write_record(NATIVE_HEADER)?;
    }
    for t in transactions {
        wtr.serialize(NativeRow::from(t))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_native_file(path: impl AsRef<Path>, transactions: &[Transaction]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| IngestError::File {
        path: path.to_path_buf(),
        source,
    })?;
    write_native_csv(file, transactions)
}
