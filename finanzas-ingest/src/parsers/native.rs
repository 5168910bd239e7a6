//! Native schema parser.
//!
//! Comma separated with a header on the first line:
//!   Date,Concept,Category,Subcategory,Amount,Balance,Subscription
//!   2024-03-01,Mercadona,Food,Supermarket,-45.20,1954.80,false
//!
//! Columns are matched by name, so order does not matter. Category,
//! Subcategory, Subscription and Hidden are optional.

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use super::{Columns, RequiredNames, RowReader};
use crate::error::Result;
use crate::normalize::{parse_iso_date, AmountParser};
use crate::types::{ParsedBatch, SchemaKind};

const NAMES: RequiredNames = RequiredNames {
    concept: "Concept",
    date: "Date",
    amount: "Amount",
    balance: "Balance",
};

pub fn parse_native_csv(content: &str) -> Result<ParsedBatch> {
    let schema = SchemaKind::Native;
    let mut rdr = ReaderBuilder::new()
        .delimiter(schema.delimiter())
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers = rdr.headers()?.clone();
    let reader = RowReader {
        names: &NAMES,
        columns: Columns::resolve(schema, &headers, &NAMES)?,
        amounts: AmountParser::new(schema.number_format())?,
        parse_date: parse_iso_date,
        line_offset: 0,
    };

    let (transactions, dropped) = reader.read(&mut rdr)?;
    debug!("Parsed {} native transactions ({} dropped)", transactions.len(), dropped);

    Ok(ParsedBatch {
        schema,
        transactions,
        dropped,
    })
}
