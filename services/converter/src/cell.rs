//! Raw cell values and the total coercions applied to them.
//!
//! Every conversion in this module succeeds: a cell that does not look like
//! a number reads as `0`, and "falsy" cells (empty text, zero, `false`)
//! select the caller's default the way the spreadsheet authors expect.

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// A decoded spreadsheet cell.
///
/// There is no "absent" variant: missing cells and missing columns read as
/// empty text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

/// Shared empty cell handed out for missing columns.
pub static EMPTY_CELL: CellValue = CellValue::Text(String::new());

impl Default for CellValue {
    fn default() -> Self {
        CellValue::empty()
    }
}

impl CellValue {
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Empty text, zero, NaN and `false` are falsy. Whitespace is not.
    pub fn is_falsy(&self) -> bool {
        match self {
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(n) => *n == 0.0 || n.is_nan(),
            CellValue::Bool(b) => !b,
            CellValue::Date(_) => false,
        }
    }

    /// True for cells that carry nothing visible.
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.trim().is_empty())
    }

    /// Render the cell as text. Integral numbers print without a fraction.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    /// Best-effort numeric value; anything unparseable is `0`.
    pub fn to_number(&self) -> f64 {
        match self {
            CellValue::Number(n) if n.is_finite() => *n,
            CellValue::Number(_) => 0.0,
            CellValue::Bool(b) => f64::from(u8::from(*b)),
            CellValue::Text(s) => parse_number(s).unwrap_or(0.0),
            CellValue::Date(_) => 0.0,
        }
    }
}

fn format_number(n: f64) -> String {
    if n == 0.0 {
        // -0.0 prints as "-0"
        return "0".to_string();
    }
    n.to_string()
}

/// Brazilian number: optional `.` thousands groups, optional `,` decimals.
const BR_NUMBER_PATTERN: &str = r"^-?(\d{1,3}(\.\d{3})+|\d+)(,\d+)?$";

fn br_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(BR_NUMBER_PATTERN).expect("valid pt-BR number pattern"))
}

/// Parse a numeric string as typed into the spreadsheet.
///
/// Plain floats (`1234.5`, `1.500`) parse as written. Text that is not a
/// plain float is read as a Brazilian number (`1.234,56`, `0,5`) when it
/// has that exact shape. With an `R$` prefix the Brazilian reading comes
/// first, so `R$ 1.500` is 1500. Anything else, including US grouping
/// like `1,234.56` and non-finite values, is `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let (s, currency) = match s.strip_prefix("R$") {
        Some(rest) => (rest.trim(), true),
        None => (s, false),
    };
    if s.is_empty() {
        return None;
    }

    if currency {
        parse_br_number(s).or_else(|| parse_plain_number(s))
    } else {
        parse_plain_number(s).or_else(|| parse_br_number(s))
    }
}

fn parse_plain_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_br_number(s: &str) -> Option<f64> {
    if !br_number_regex().is_match(s) {
        return None;
    }
    let normalized = s.replace('.', "").replace(',', ".");
    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falsy_cells() {
        assert!(CellValue::empty().is_falsy());
        assert!(CellValue::Number(0.0).is_falsy());
        assert!(CellValue::Number(f64::NAN).is_falsy());
        assert!(CellValue::Bool(false).is_falsy());

        assert!(!CellValue::text(" ").is_falsy());
        assert!(!CellValue::text("0").is_falsy());
        assert!(!CellValue::Number(-1.0).is_falsy());
        assert!(!CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).is_falsy());
    }

    #[test]
    fn test_blank_cells() {
        assert!(CellValue::text("   ").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }

    #[test]
    fn test_number_to_text_drops_integral_fraction() {
        assert_eq!(CellValue::Number(100.0).to_text(), "100");
        assert_eq!(CellValue::Number(12.5).to_text(), "12.5");
        assert_eq!(CellValue::Number(-0.0).to_text(), "0");
    }

    #[test]
    fn test_date_and_bool_to_text() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(CellValue::Date(date).to_text(), "2024-03-05");
        assert_eq!(CellValue::Bool(true).to_text(), "true");
    }

    #[test]
    fn test_parse_number_plain() {
        assert_eq!(parse_number("1000"), Some(1000.0));
        assert_eq!(parse_number("  12.75 "), Some(12.75));
        assert_eq!(parse_number("-3"), Some(-3.0));
    }

    #[test]
    fn test_parse_number_brazilian_format() {
        assert_eq!(parse_number("1.234,56"), Some(1234.56));
        assert_eq!(parse_number("R$ 250,00"), Some(250.0));
        assert_eq!(parse_number("0,5"), Some(0.5));
    }

    #[test]
    fn test_parse_number_rejects_garbage() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("12 peças"), None);
    }

    #[test]
    fn test_parse_number_us_grouping_is_rejected() {
        assert_eq!(parse_number("1,234.56"), None);
        assert_eq!(parse_number("1,2,3"), None);
        assert_eq!(parse_number("12.34,5.6"), None);
    }

    #[test]
    fn test_parse_number_dotted_thousands() {
        // plain text reads as a decimal, currency text as thousands
        assert_eq!(parse_number("1.500"), Some(1.5));
        assert_eq!(parse_number("R$ 1.500"), Some(1500.0));
        assert_eq!(parse_number("R$ 1.500,00"), Some(1500.0));
        assert_eq!(parse_number("12.345.678"), Some(12345678.0));
        assert_eq!(parse_number("R$ 2500"), Some(2500.0));
        assert_eq!(parse_number("R$ 12.75"), Some(12.75));
        assert_eq!(parse_number("R$ 1,234.56"), None);
    }

    #[test]
    fn test_to_number_defaults_to_zero() {
        assert_eq!(CellValue::text("abc").to_number(), 0.0);
        assert_eq!(CellValue::empty().to_number(), 0.0);
        assert_eq!(CellValue::Number(f64::NAN).to_number(), 0.0);
        assert_eq!(CellValue::Bool(true).to_number(), 1.0);
        assert_eq!(CellValue::text("42").to_number(), 42.0);
    }

    #[test]
    fn test_serializes_untagged() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(serde_json::to_value(CellValue::text("x")).unwrap(), serde_json::json!("x"));
        assert_eq!(serde_json::to_value(CellValue::Number(45000.0)).unwrap(), serde_json::json!(45000.0));
        assert_eq!(serde_json::to_value(CellValue::Date(date)).unwrap(), serde_json::json!("2024-03-05"));
    }
}
