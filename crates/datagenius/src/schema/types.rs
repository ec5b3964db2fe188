//! Data types a schema column can demand.

use serde::{Deserialize, Serialize};

use crate::numerics::{classify_numeric, NumericKind};

/// Expected data type of a column's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Text that is not a number.
    Str,
    /// Whole numbers without significant leading zeros.
    Int,
    /// Numbers with a decimal point. Whole numbers are accepted too.
    Float,
    /// Whole numbers whose leading zeros must be kept.
    ZeroNumeric,
    /// No type constraint.
    Any,
}

impl DataType {
    /// Returns true if `value` has this type.
    pub fn matches(&self, value: &str) -> bool {
        let kind = classify_numeric(value);
        match self {
            DataType::Str => kind.is_none(),
            DataType::Int => kind == Some(NumericKind::Integer),
            DataType::Float => matches!(kind, Some(NumericKind::Float | NumericKind::Integer)),
            DataType::ZeroNumeric => kind == Some(NumericKind::ZeroNumeric),
            DataType::Any => true,
        }
    }
}

impl Default for DataType {
    fn default() -> Self {
        DataType::Any
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches() {
        assert!(DataType::Int.matches("1"));
        assert!(!DataType::Int.matches("01"));
        assert!(!DataType::Int.matches("a"));
        assert!(DataType::Str.matches("a"));
        assert!(!DataType::Str.matches("1"));
        assert!(DataType::Float.matches("1.5"));
        assert!(DataType::Float.matches("2"));
        assert!(DataType::ZeroNumeric.matches("00025"));
        assert!(DataType::Any.matches("whatever"));
    }
}
