//! Schema detection from the header tokens at each schema's header line

use tracing::debug;

use crate::types::SchemaKind;

/// Detect which known schema `content` uses.
///
/// A schema matches when every one of its required header tokens appears in
/// the line where that schema keeps its header. Unknown layouts fall back to
/// the native schema; detection alone never fails.
pub fn detect_format(content: &str) -> SchemaKind {
    for schema in SchemaKind::DETECTION_ORDER {
        if header_matches(content, schema) {
            debug!(%schema, "detected statement format");
            return schema;
        }
    }
    debug!("no known header found, assuming native format");
    SchemaKind::Native
}

fn header_matches(content: &str, schema: SchemaKind) -> bool {
    let Some(line) = content.lines().nth(schema.header_line()) else {
        return false;
    };
    let tokens: Vec<&str> = line
        .split(schema.delimiter() as char)
        .map(|t| t.trim().trim_matches('"').trim())
        .collect();
    schema
        .required_headers()
        .iter()
        .all(|required| tokens.contains(required))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_bank_export_on_third_line() {
        let content = "Cuenta;ES00 0000\n\nConcepto;Fecha;Importe;Saldo\nCafe;01/03/2024;-5,30;1.234,56 EUR\n";
        assert_eq!(detect_format(content), SchemaKind::BankExport);
    }

    #[test]
    fn test_detects_native_header() {
        let content = "Date,Concept,Category,Subcategory,Amount,Balance\n2024-03-01,Cafe,,,-5.3,100\n";
        assert_eq!(detect_format(content), SchemaKind::Native);
    }

    #[test]
    fn test_quoted_header_tokens() {
        let content = "x\ny\n\"Concepto\";\"Fecha\";\"Importe\";\"Saldo\"\n";
        assert_eq!(detect_format(content), SchemaKind::BankExport);
    }

    #[test]
    fn test_partial_bank_header_falls_back_to_native() {
        let content = "x\ny\nConcepto;Fecha;Importe\n";
        assert_eq!(detect_format(content), SchemaKind::Native);
    }

    #[test]
    fn test_empty_and_unknown_default_native() {
        assert_eq!(detect_format(""), SchemaKind::Native);
        assert_eq!(detect_format("foo,bar\n1,2\n"), SchemaKind::Native);
    }
}
