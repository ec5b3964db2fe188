//! Validation rules for a single column.

use regex::Regex;
use serde::{Deserialize, Deserializer};

use super::types::DataType;

/// Rules a column's values must satisfy.
///
/// When any valid values or patterns are given, invalid values and patterns
/// are ignored: an allow-list already excludes everything else.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawColumn")]
pub struct SchemaColumn {
    /// Required data type.
    pub data_type: DataType,
    /// Null values fail when set.
    pub required: bool,
    /// Values may not repeat within the column.
    pub unique: bool,
    /// Exact values that pass.
    pub valid_values: Vec<String>,
    /// Exact values that fail.
    pub invalid_values: Vec<String>,
    /// Regexes that pass on a match anywhere in the value.
    pub valid_patterns: Vec<Regex>,
    /// Regexes that fail on a match anywhere in the value.
    pub invalid_patterns: Vec<Regex>,
}

impl SchemaColumn {
    /// A column constrained only by data type.
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            required: false,
            unique: false,
            valid_values: Vec::new(),
            invalid_values: Vec::new(),
            valid_patterns: Vec::new(),
            invalid_patterns: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_valid_values<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.valid_values = values.into_iter().map(Into::into).collect();
        self.clear_invalid();
        self
    }

    pub fn with_valid_patterns(mut self, patterns: &[&str]) -> Result<Self, regex::Error> {
        self.valid_patterns = compile_all(patterns)?;
        self.clear_invalid();
        Ok(self)
    }

    pub fn with_invalid_values<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        if !self.has_allow_list() {
            self.invalid_values = values.into_iter().map(Into::into).collect();
        }
        self
    }

    pub fn with_invalid_patterns(mut self, patterns: &[&str]) -> Result<Self, regex::Error> {
        if !self.has_allow_list() {
            self.invalid_patterns = compile_all(patterns)?;
        }
        Ok(self)
    }

    fn has_allow_list(&self) -> bool {
        !self.valid_values.is_empty() || !self.valid_patterns.is_empty()
    }

    fn clear_invalid(&mut self) {
        self.invalid_values.clear();
        self.invalid_patterns.clear();
    }

    /// Check a single cell against every rule except uniqueness.
    pub fn evaluate(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return !self.required;
        };
        if !self.data_type.matches(value) {
            return false;
        }
        if self.invalid_values.iter().any(|v| v == value)
            || self.invalid_patterns.iter().any(|p| p.is_match(value))
        {
            return false;
        }
        if self.has_allow_list() {
            return self.valid_values.iter().any(|v| v == value)
                || self.valid_patterns.iter().any(|p| p.is_match(value));
        }
        true
    }
}

fn compile_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>, regex::Error> {
    patterns.iter().map(|p| Regex::new(p.as_ref())).collect()
}

/// Serialized form of a column. Values may be written as YAML numbers or
/// strings; both are compared as text.
#[derive(Deserialize)]
struct RawColumn {
    #[serde(default)]
    data_type: DataType,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    unique: bool,
    #[serde(default, deserialize_with = "scalar_list")]
    valid_values: Vec<String>,
    #[serde(default, deserialize_with = "scalar_list")]
    invalid_values: Vec<String>,
    #[serde(default)]
    valid_patterns: Vec<String>,
    #[serde(default)]
    invalid_patterns: Vec<String>,
}

impl TryFrom<RawColumn> for SchemaColumn {
    type Error = regex::Error;

    fn try_from(raw: RawColumn) -> Result<Self, Self::Error> {
        let mut column = SchemaColumn::new(raw.data_type);
        column.required = raw.required;
        column.unique = raw.unique;
        column.invalid_values = raw.invalid_values;
        column.invalid_patterns = compile_all(&raw.invalid_patterns)?;
        column.valid_values = raw.valid_values;
        column.valid_patterns = compile_all(&raw.valid_patterns)?;
        if column.has_allow_list() {
            column.clear_invalid();
        }
        Ok(column)
    }
}

fn scalar_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Vec<serde_yaml::Value> = Vec::deserialize(deserializer)?;
    values
        .into_iter()
        .map(|v| match v {
            serde_yaml::Value::String(s) => Ok(s),
            serde_yaml::Value::Number(n) => Ok(n.to_string()),
            serde_yaml::Value::Bool(b) => Ok(b.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "expected a scalar value, found {:?}",
                other
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_only() {
        let c = SchemaColumn::new(DataType::Int);
        assert!(c.evaluate(Some("1")));
        assert!(!c.evaluate(Some("one")));
        assert!(c.evaluate(None));
        assert!(!c.clone().required().evaluate(None));
    }

    #[test]
    fn test_valid_values() {
        let c = SchemaColumn::new(DataType::Int).with_valid_values(["1", "2", "3"]);
        assert!(c.evaluate(Some("1")));
        assert!(!c.evaluate(Some("4")));
    }

    #[test]
    fn test_valid_patterns() {
        let c = SchemaColumn::new(DataType::Str)
            .with_valid_patterns(&[r"^S$", r"^M$", r"^L$", r"^X+L$"])
            .unwrap();
        assert!(c.evaluate(Some("S")));
        assert!(!c.evaluate(Some("Small")));
        assert!(c.evaluate(Some("XL")));
        assert!(c.evaluate(Some("XXXL")));
        assert!(!c.evaluate(Some("-XL")));
    }

    #[test]
    fn test_invalid_patterns_search_anywhere() {
        let c = SchemaColumn::new(DataType::Str)
            .with_invalid_patterns(&[r"size\d"])
            .unwrap();
        assert!(!c.evaluate(Some("part_size1")));
        assert!(c.evaluate(Some("part_size")));
    }

    #[test]
    fn test_allow_list_clears_deny_list() {
        let c = SchemaColumn::new(DataType::Str)
            .with_invalid_values(["a"])
            .with_valid_values(["a", "b"]);
        assert!(c.invalid_values.is_empty());
        assert!(c.evaluate(Some("a")));
    }
}
