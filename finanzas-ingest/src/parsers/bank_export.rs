//! Bank export parser (CaixaBank-style CSV).
//!
//! Two preamble lines, then a semicolon separated table:
//!   Concepto;Fecha;Importe;Saldo
//!   Cafe;01/03/2024;-5,30;1.234,56 EUR
//!
//! Dates are DD/MM/YYYY, numbers use `.` for thousands and `,` for decimals,
//! and the balance carries a currency suffix. Exports have no categories.

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use super::{Columns, RequiredNames, RowReader};
use crate::error::Result;
use crate::normalize::{parse_dmy_date, AmountParser};
use crate::types::{ParsedBatch, SchemaKind};

const NAMES: RequiredNames = RequiredNames {
    concept: "Concepto",
    date: "Fecha",
    amount: "Importe",
    balance: "Saldo",
};

/// Everything after the first `n` lines
fn skip_lines(content: &str, n: usize) -> &str {
    let mut rest = content;
    for _ in 0..n {
        match rest.find('\n') {
            Some(i) => rest = &rest[i + 1..],
            None => return "",
        }
    }
    rest
}

pub fn parse_bank_export_csv(content: &str) -> Result<ParsedBatch> {
    let schema = SchemaKind::BankExport;
    let preamble = schema.header_line();
    let table = skip_lines(content, preamble);

    let mut rdr = ReaderBuilder::new()
        .delimiter(schema.delimiter())
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(table.as_bytes());

    let headers = rdr.headers()?.clone();
    let reader = RowReader {
        names: &NAMES,
        columns: Columns::resolve(schema, &headers, &NAMES)?,
        amounts: AmountParser::new(schema.number_format())?,
        parse_date: parse_dmy_date,
        line_offset: preamble as u64,
    };

    let (transactions, dropped) = reader.read(&mut rdr)?;
    debug!("Parsed {} bank export transactions ({} dropped)", transactions.len(), dropped);

    Ok(ParsedBatch {
        schema,
        transactions,
        dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use chrono::NaiveDate;

    const SAMPLE: &str = "\
Número de cuenta;ES12 3456 7890 1234
Movimientos del 01/03/2024 al 31/03/2024
Concepto;Fecha;Importe;Saldo
Cafe;01/03/2024;-5,30;1.234,56 EUR
NOMINA ACME SL;05/03/2024;2.100,00;3.334,56 EUR
;;;
";

    #[test]
    fn test_parse_bank_export_row() {
        let batch = parse_bank_export_csv(SAMPLE).unwrap();
        assert_eq!(batch.schema, SchemaKind::BankExport);
        assert_eq!(batch.transactions.len(), 2);

        let cafe = &batch.transactions[0];
        assert_eq!(cafe.concept, "Cafe");
        assert_eq!(cafe.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(cafe.amount, -5.30);
        assert_eq!(cafe.balance, 1234.56);
        assert!(cafe.is_uncategorized());
        assert!(!cafe.subscription);

        assert_eq!(batch.transactions[1].amount, 2100.0);
        assert_eq!(batch.transactions[1].balance, 3334.56);
    }

    #[test]
    fn test_error_line_counts_preamble() {
        let content = "a\nb\nConcepto;Fecha;Importe;Saldo\nCafe;2024-03-01;-5,30;10,00 EUR\n";
        match parse_bank_export_csv(content) {
            Err(IngestError::InvalidDate { line, .. }) => assert_eq!(line, 4),
            other => panic!("expected InvalidDate, got {other:?}"),
        }
    }

    #[test]
    fn test_dot_decimal_amount_fails_import() {
        let content = "a\nb\nConcepto;Fecha;Importe;Saldo\nCafe;01/03/2024;-5.30;1.234,56 EUR\n";
        match parse_bank_export_csv(content) {
            Err(IngestError::InvalidNumber { line, column, value }) => {
                assert_eq!(line, 4);
                assert_eq!(column, "Importe");
                assert_eq!(value, "-5.30");
            }
            other => panic!("expected InvalidNumber, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_rows_dropped() {
        let content = "a\nb\nConcepto;Fecha;Importe;Saldo\nCafe;01/03/2024;-5,30;\nBus;02/03/2024;-1,00;9,00 EUR\n";
        let batch = parse_bank_export_csv(content).unwrap();
        assert_eq!(batch.transactions.len(), 1);
        assert_eq!(batch.dropped, 1);
    }

    #[test]
    fn test_skip_lines() {
        assert_eq!(skip_lines("a\nb\nc", 2), "c");
        assert_eq!(skip_lines("a", 2), "");
    }
}
