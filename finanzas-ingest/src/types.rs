use std::fmt;

use finanzas_core::Transaction;
use serde::{Deserialize, Serialize};

/// CSV layouts the importer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaKind {
    /// `Concept,Date,Amount,Balance[,Category,Subcategory,Subscription,Hidden]`
    Native,
    /// Semicolon separated bank export with a two line preamble
    /// (`Concepto;Fecha;Importe;Saldo`)
    BankExport,
}

impl SchemaKind {
    /// Order in which detection tries the schemas; native is also the fallback
    pub const DETECTION_ORDER: [SchemaKind; 2] = [SchemaKind::BankExport, SchemaKind::Native];

    /// Zero-based line holding the header
    pub fn header_line(&self) -> usize {
        match self {
            SchemaKind::Native => 0,
            SchemaKind::BankExport => 2,
        }
    }

    pub fn delimiter(&self) -> u8 {
        match self {
            SchemaKind::Native => b',',
            SchemaKind::BankExport => b';',
        }
    }

    /// Header tokens that must all be present for detection to match
    pub fn required_headers(&self) -> &'static [&'static str] {
        match self {
            SchemaKind::Native => &["Concept", "Date", "Amount", "Balance"],
            SchemaKind::BankExport => &["Concepto", "Fecha", "Importe", "Saldo"],
        }
    }

    pub fn number_format(&self) -> NumberFormat {
        match self {
            SchemaKind::Native => NumberFormat::DOT_DECIMAL,
            SchemaKind::BankExport => NumberFormat::COMMA_DECIMAL,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaKind::Native => f.write_str("native"),
            SchemaKind::BankExport => f.write_str("bank-export"),
        }
    }
}

/// Decimal and thousands separators of a monetary column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    pub decimal: char,
    pub thousands: char,
}

impl NumberFormat {
    /// `1,234.56`
    pub const DOT_DECIMAL: NumberFormat = NumberFormat {
        decimal: '.',
        thousands: ',',
    };
    /// `1.234,56`
    pub const COMMA_DECIMAL: NumberFormat = NumberFormat {
        decimal: ',',
        thousands: '.',
    };
}

/// Normalized output of a statement parse
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBatch {
    pub schema: SchemaKind,
    pub transactions: Vec<Transaction>,
    /// Rows skipped because a required field was blank
    pub dropped: usize,
}
