//! Explore stage: reports about the data. Nothing here modifies the dataset.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::frame::Dataset;
use crate::numerics::is_numeric;
use crate::transmutation::{Report, Stage, Transmutation};

/// Distinct non-null values per column.
#[derive(Debug, Clone, Default)]
pub struct CountUniques;

impl Transmutation for CountUniques {
    fn name(&self) -> &str {
        "count_uniques"
    }

    fn stage(&self) -> Stage {
        Stage::Explore
    }

    fn transmute(&self, dataset: &mut Dataset) -> Result<Report> {
        let counts = dataset.header.iter().enumerate().map(|(col, label)| {
            let uniques: BTreeSet<&str> = dataset.column_values(col).flatten().collect();
            (label.to_string(), uniques.len())
        });
        Ok(Report::new(self.name(), self.stage()).with_counts(counts.collect::<Vec<_>>()))
    }
}

/// Null cells per column.
#[derive(Debug, Clone, Default)]
pub struct CountNulls;

impl Transmutation for CountNulls {
    fn name(&self) -> &str {
        "count_nulls"
    }

    fn stage(&self) -> Stage {
        Stage::Explore
    }

    fn transmute(&self, dataset: &mut Dataset) -> Result<Report> {
        let counts: Vec<(String, usize)> = dataset
            .header
            .iter()
            .enumerate()
            .map(|(col, label)| (label.to_string(), dataset.null_count(col)))
            .collect();
        Ok(Report::new(self.name(), self.stage()).with_counts(counts))
    }
}

/// Best guess at what a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbableType {
    Numeric,
    String,
    Uncertain,
}

/// Share of string and numeric values in a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeProfile {
    pub str_pct: f64,
    pub num_pct: f64,
    pub probable_type: ProbableType,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

impl TypeProfile {
    /// Profile a column's non-null values.
    pub fn from_values<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        let mut total = 0usize;
        let mut numeric = 0usize;
        for v in values.into_iter().flatten() {
            total += 1;
            if is_numeric(v) {
                numeric += 1;
            }
        }
        if total == 0 {
            return Self {
                str_pct: 0.0,
                num_pct: 0.0,
                probable_type: ProbableType::Uncertain,
            };
        }
        let num_pct = round2(numeric as f64 / total as f64);
        let str_pct = round2((total - numeric) as f64 / total as f64);
        let probable_type = if num_pct > str_pct {
            ProbableType::Numeric
        } else if str_pct > num_pct {
            ProbableType::String
        } else {
            ProbableType::Uncertain
        };
        Self {
            str_pct,
            num_pct,
            probable_type,
        }
    }
}

/// Per-column [`TypeProfile`].
#[derive(Debug, Clone, Default)]
pub struct TypesReport;

impl Transmutation for TypesReport {
    fn name(&self) -> &str {
        "types_report"
    }

    fn stage(&self) -> Stage {
        Stage::Explore
    }

    fn transmute(&self, dataset: &mut Dataset) -> Result<Report> {
        let mut report = Report::new(self.name(), self.stage());
        for (col, label) in dataset.header.iter().enumerate() {
            let profile = TypeProfile::from_values(dataset.column_values(col));
            report = report.with_value(label, serde_json::to_value(profile)?);
        }
        Ok(report)
    }
}

/// Distinct values in a column, or a marker that every value is distinct.
#[derive(Debug, Clone, PartialEq)]
pub enum UniqueValues {
    /// Every non-null value differs, so listing them is pointless.
    PrimaryKey,
    Values(BTreeSet<String>),
}

impl Serialize for UniqueValues {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            UniqueValues::PrimaryKey => serializer.serialize_str("primary_key"),
            UniqueValues::Values(set) => set.serialize(serializer),
        }
    }
}

/// Unique count and values for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniquesProfile {
    pub unique_ct: usize,
    pub unique_values: UniqueValues,
}

impl UniquesProfile {
    pub fn from_values<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        let present: Vec<&str> = values.into_iter().flatten().collect();
        let set: BTreeSet<String> = present.iter().map(|s| s.to_string()).collect();
        let unique_ct = set.len();
        let unique_values = if unique_ct > 0 && unique_ct == present.len() {
            UniqueValues::PrimaryKey
        } else {
            UniqueValues::Values(set)
        };
        Self {
            unique_ct,
            unique_values,
        }
    }
}

/// Per-column [`UniquesProfile`].
#[derive(Debug, Clone, Default)]
pub struct UniquesReport;

impl Transmutation for UniquesReport {
    fn name(&self) -> &str {
        "uniques_report"
    }

    fn stage(&self) -> Stage {
        Stage::Explore
    }

    fn transmute(&self, dataset: &mut Dataset) -> Result<Report> {
        let mut report = Report::new(self.name(), self.stage());
        for (col, label) in dataset.header.iter().enumerate() {
            let profile = UniquesProfile::from_values(dataset.column_values(col));
            report = report.with_value(label, serde_json::to_value(profile)?);
        }
        Ok(report)
    }
}

/// Convenience for reading a nested report field.
pub fn profile_field<'a>(report: &'a Report, column: &str, field: &str) -> Option<&'a Value> {
    report.metadata.get(column).and_then(|v| v.get(field))
}
