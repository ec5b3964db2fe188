//! Numeric detection and conversion for text cells.
//!
//! Spreadsheet exports store numbers as text, often with stray characters or
//! significant leading zeros. These helpers decide what a cell "really" is
//! without losing information.

mod zero_numeric;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use zero_numeric::{split_zeros, ZeroNumeric};

// =============================================================================
// Numeric Patterns
// =============================================================================

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-*\d+$").unwrap());

static FLOAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-*\d+\.+\d*$").unwrap());

static DOT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.+").unwrap());

/// What kind of number a string holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericKind {
    Integer,
    Float,
    /// An integer whose leading zeros are significant.
    ZeroNumeric,
}

/// A converted numeric value.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
    Zero(ZeroNumeric),
}

impl Number {
    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Int(n) => *n as f64,
            Number::Float(f) => *f,
            Number::Zero(z) => z.to_f64(),
        }
    }
}

/// Classify a string as numeric, returning `None` for anything else.
///
/// Repeated decimal points (`1..23`) are tolerated as a float.
pub fn classify_numeric(text: &str) -> Option<NumericKind> {
    let text = text.trim();
    if INTEGER.is_match(text) {
        if text.starts_with('0') && text != "0" {
            Some(NumericKind::ZeroNumeric)
        } else {
            Some(NumericKind::Integer)
        }
    } else if FLOAT.is_match(text) {
        Some(NumericKind::Float)
    } else {
        None
    }
}

/// Whether a string holds a number of any kind.
pub fn is_numeric(text: &str) -> bool {
    classify_numeric(text).is_some()
}

/// Collapse runs of decimal points into one.
pub(crate) fn collapse_dots(text: &str) -> String {
    DOT_RUN.replace_all(text, ".").into_owned()
}

/// Render a float the way a spreadsheet user expects: whole numbers keep a
/// trailing `.0`.
pub(crate) fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Convert a string to its numeric value.
pub fn convert_numeric(text: &str) -> Option<Number> {
    let text = text.trim();
    match classify_numeric(text)? {
        NumericKind::ZeroNumeric => ZeroNumeric::new(text).ok().map(Number::Zero),
        NumericKind::Integer => {
            let negative = text.chars().take_while(|c| *c == '-').count() % 2 == 1;
            let digits = text.trim_start_matches('-');
            match digits.parse::<i64>() {
                Ok(n) => Some(Number::Int(if negative { -n } else { n })),
                Err(_) => digits
                    .parse::<f64>()
                    .ok()
                    .map(|f| Number::Float(if negative { -f } else { f })),
            }
        }
        NumericKind::Float => {
            let negative = text.chars().take_while(|c| *c == '-').count() % 2 == 1;
            let f: f64 = collapse_dots(text.trim_start_matches('-')).parse().ok()?;
            Some(Number::Float(if negative { -f } else { f }))
        }
    }
}

/// Repair a number mangled by a typo.
///
/// A comma is read as a decimal point and any other stray characters are
/// dropped. Text with no recoverable number is returned unchanged.
///
/// ```
/// use datagenius::numerics::clean_numeric_typo;
/// assert_eq!(clean_numeric_typo("1q0.1q"), "10.1");
/// assert_eq!(clean_numeric_typo("abc"), "abc");
/// ```
pub fn clean_numeric_typo(text: &str) -> String {
    let repaired: String = text
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if classify_numeric(&repaired).is_some() {
        repaired
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_numeric() {
        assert_eq!(classify_numeric("123"), Some(NumericKind::Integer));
        assert_eq!(classify_numeric("-5"), Some(NumericKind::Integer));
        assert_eq!(classify_numeric("0"), Some(NumericKind::Integer));
        assert_eq!(classify_numeric("00123"), Some(NumericKind::ZeroNumeric));
        assert_eq!(classify_numeric("1.5"), Some(NumericKind::Float));
        assert_eq!(classify_numeric("0.00"), Some(NumericKind::Float));
        assert_eq!(classify_numeric("1..23"), Some(NumericKind::Float));
        assert_eq!(classify_numeric("0abc"), None);
        assert_eq!(classify_numeric("abc"), None);
        assert_eq!(classify_numeric(""), None);
    }

    #[test]
    fn test_convert_numeric() {
        assert_eq!(convert_numeric("42"), Some(Number::Int(42)));
        assert_eq!(convert_numeric("1..23"), Some(Number::Float(1.23)));
        assert_eq!(convert_numeric("-2.5"), Some(Number::Float(-2.5)));
        match convert_numeric("00076") {
            Some(Number::Zero(z)) => assert_eq!(z.as_str(), "00076"),
            other => panic!("expected zero numeric, got {:?}", other),
        }
        assert_eq!(convert_numeric("x1"), None);
    }

    #[test]
    fn test_clean_numeric_typo() {
        assert_eq!(clean_numeric_typo("1,9"), "1.9");
        assert_eq!(clean_numeric_typo("10.1q"), "10.1");
        assert_eq!(clean_numeric_typo("101q"), "101");
        assert_eq!(clean_numeric_typo("1q0.1q"), "10.1");
        assert_eq!(clean_numeric_typo("abc"), "abc");
        assert_eq!(clean_numeric_typo("1.2.3"), "1.2.3");
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(13.0), "13.0");
        assert_eq!(format_float(13.5), "13.5");
    }
}
