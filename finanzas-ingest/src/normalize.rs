//! Field-level normalization shared by the schema parsers

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::error::Result;
use crate::types::NumberFormat;

/// Parses monetary columns written with one set of separators
#[derive(Debug, Clone)]
pub struct AmountParser {
    currency_re: Regex,
    number_re: Regex,
    format: NumberFormat,
}

impl AmountParser {
    pub fn new(format: NumberFormat) -> Result<Self> {
        let thousands = regex::escape(&format.thousands.to_string());
        let decimal = regex::escape(&format.decimal.to_string());
        // thousands separators only between 3-digit groups, left of the decimal
        let number = format!(r"^[-+]?(?:\d{{1,3}}(?:{thousands}\d{{3}})+|\d+)(?:{decimal}\d*)?$");
        Ok(Self {
            currency_re: Regex::new(r"(?i)eur|usd|€|\$")?,
            number_re: Regex::new(&number)?,
            format,
        })
    }

    /// Currency codes/symbols and whitespace are stripped, thousands
    /// separators removed and the decimal separator normalized.
    /// `(12.50)` reads as negative. A separator out of place (`-5.30`
    /// under comma-decimal, `-1,5` under dot-decimal) is `None`.
    pub fn parse(&self, raw: &str) -> Option<f64> {
        let stripped = self.currency_re.replace_all(raw, "");
        let cleaned: String = stripped.chars().filter(|c| !c.is_whitespace()).collect();

        let (negate, body) = match cleaned.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
            Some(inner) => (true, inner),
            None => (false, cleaned.as_str()),
        };
        if !self.number_re.is_match(body) {
            return None;
        }

        let mut plain: String = body.chars().filter(|c| *c != self.format.thousands).collect();
        if self.format.decimal != '.' {
            plain = plain.replace(self.format.decimal, ".");
        }
        let value: f64 = plain.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        Some(if negate { -value } else { value })
    }
}

/// One-off parse of a monetary value; parsers reuse an `AmountParser` instead.
pub fn parse_amount(raw: &str, format: NumberFormat) -> Result<Option<f64>> {
    Ok(AmountParser::new(format)?.parse(raw))
}

const ISO_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Dates in the native schema: ISO day, optionally with a time part
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for fmt in ISO_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    for fmt in ISO_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Dates in bank exports: DD/MM/YYYY
pub fn parse_dmy_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y").ok()
}

/// Optional boolean columns. Blank means false; `None` for anything unrecognised.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "" | "false" | "0" | "no" | "n" | "f" => Some(false),
        "true" | "1" | "yes" | "y" | "t" | "x" | "si" | "sí" => Some(true),
        _ => None,
    }
}
