//! Numbers whose leading zeros carry meaning (zip codes, UPCs, account ids).

use std::cmp::Ordering;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{classify_numeric, format_float, NumericKind};
use crate::error::{GeniusError, Result};

static ZERO_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(-*)(0*)(.*)$").unwrap());

/// A numeric string that keeps its leading zeros.
///
/// Arithmetic operates on the numeric part and re-attaches the zeros, so
/// `00123 + 1` is `00124`. The digits after the zeros are kept as text, so
/// ids longer than any machine integer survive padding unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroNumeric {
    value: String,
    zeros: String,
    digits: String,
    negative: bool,
    numeric: f64,
    integral: bool,
}

impl ZeroNumeric {
    /// Parse a numeric string. Apostrophes (a common spreadsheet escape) are
    /// stripped first.
    pub fn new(text: &str) -> Result<Self> {
        let value: String = text.trim().chars().filter(|c| *c != '\'').collect();
        let kind = classify_numeric(&value).ok_or_else(|| GeniusError::NotNumeric(text.to_string()))?;
        let parts = split_parts(&value).ok_or_else(|| GeniusError::NotNumeric(text.to_string()))?;
        let numeric = parts.to_f64().ok_or_else(|| GeniusError::NotNumeric(text.to_string()))?;
        Ok(Self {
            value,
            zeros: parts.zeros,
            digits: parts.digits,
            negative: parts.negative,
            numeric,
            integral: kind != NumericKind::Float,
        })
    }

    /// Build from an integer. There are no leading zeros to keep.
    pub fn from_int(n: i64) -> Self {
        Self {
            value: n.to_string(),
            zeros: String::new(),
            digits: n.unsigned_abs().to_string(),
            negative: n < 0,
            numeric: n as f64,
            integral: true,
        }
    }

    /// The raw text, leading zeros included.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The leading zeros.
    pub fn zeros(&self) -> &str {
        &self.zeros
    }

    /// The numeric part as written, without sign or leading zeros.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn to_f64(&self) -> f64 {
        self.numeric
    }

    /// Integer value, truncating any fraction. Saturates outside `i64`.
    pub fn to_i64(&self) -> i64 {
        self.numeric as i64
    }

    /// Left-pad with zeros to `length` characters. Values already that long
    /// are returned unchanged apart from dropping surplus zeros.
    pub fn pad(&self, length: usize) -> Self {
        let zeros = "0".repeat(length.saturating_sub(self.digits.len()));
        Self {
            value: self.render(&zeros, &self.digits),
            zeros,
            digits: self.digits.clone(),
            negative: self.negative,
            numeric: self.numeric,
            integral: self.integral,
        }
    }

    fn render(&self, zeros: &str, digits: &str) -> String {
        let sign = if self.negative { "-" } else { "" };
        format!("{}{}{}", sign, zeros, digits)
    }

    /// Rebuild around a new positive numeric part.
    fn with_digits(&self, digits: String, numeric: f64) -> Self {
        Self {
            value: format!("{}{}", self.zeros, digits),
            zeros: self.zeros.clone(),
            digits,
            negative: false,
            numeric,
            integral: self.integral,
        }
    }

    fn offset(&self, delta: i128) -> Option<Self> {
        if self.integral {
            let current: i128 = self.digits.parse().ok()?;
            let current = if self.negative { -current } else { current };
            let result = current.checked_add(delta)?;
            (result > 0).then(|| self.with_digits(result.to_string(), result as f64))
        } else {
            let result = self.numeric + delta as f64;
            (result > 0.0).then(|| self.with_digits(format_float(result), result))
        }
    }

    /// Add to the numeric part. A result of zero or below has no leading
    /// zeros to keep and yields `None`, as does integer overflow.
    pub fn checked_add(&self, rhs: i64) -> Option<Self> {
        self.offset(rhs as i128)
    }

    /// Subtract from the numeric part. See [`ZeroNumeric::checked_add`].
    pub fn checked_sub(&self, rhs: i64) -> Option<Self> {
        self.offset(-(rhs as i128))
    }
}

struct Parts {
    negative: bool,
    zeros: String,
    digits: String,
}

impl Parts {
    fn to_f64(&self) -> Option<f64> {
        let numeric: f64 = self.digits.parse().ok()?;
        Some(if self.negative { -numeric } else { numeric })
    }
}

fn split_parts(text: &str) -> Option<Parts> {
    let caps = ZERO_SPLIT.captures(text)?;
    let negative = caps[1].len() % 2 == 1;
    let mut zeros = caps[2].to_string();
    let mut rest = caps[3].to_string();
    // "0.5" keeps its integer zero; "000" is a single zero with padding.
    if rest.starts_with('.') || (rest.is_empty() && !zeros.is_empty()) {
        zeros.pop();
        rest = format!("0{}", rest);
    }
    Some(Parts {
        negative,
        zeros,
        digits: super::collapse_dots(&rest),
    })
}

/// Split a numeric string into its leading zeros and numeric value.
///
/// ```
/// use datagenius::numerics::split_zeros;
/// assert_eq!(split_zeros("00123").unwrap(), ("00".to_string(), 123.0));
/// ```
pub fn split_zeros(text: &str) -> Result<(String, f64)> {
    let parts = split_parts(text).ok_or_else(|| GeniusError::NotNumeric(text.to_string()))?;
    let numeric = parts.to_f64().ok_or_else(|| GeniusError::NotNumeric(text.to_string()))?;
    Ok((parts.zeros, numeric))
}

impl fmt::Display for ZeroNumeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}", self.value)
    }
}

impl PartialEq<f64> for ZeroNumeric {
    fn eq(&self, other: &f64) -> bool {
        self.numeric == *other
    }
}

impl PartialEq<i64> for ZeroNumeric {
    fn eq(&self, other: &i64) -> bool {
        self.numeric == *other as f64
    }
}

impl PartialEq<&str> for ZeroNumeric {
    fn eq(&self, other: &&str) -> bool {
        self.value == *other
    }
}

impl PartialOrd<f64> for ZeroNumeric {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.numeric.partial_cmp(other)
    }
}
