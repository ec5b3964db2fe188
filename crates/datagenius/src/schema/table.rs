//! Table-level schema: an ordered set of column rules.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use super::column::SchemaColumn;
use crate::error::{GeniusError, Result};
use crate::frame::Dataset;

/// Rules for an entire table, keyed by column label.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    columns: IndexMap<String, SchemaColumn>,
}

/// Outcome of checking a dataset against a schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaViolations {
    /// Rows with at least one failing value, in ascending order.
    pub rows: Vec<usize>,
    /// Failing values per column label.
    pub per_column: IndexMap<String, usize>,
}

impl Schema {
    /// Create a new empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column rule.
    pub fn with_column(mut self, label: impl Into<String>, column: SchemaColumn) -> Self {
        self.columns.insert(label.into(), column);
        self
    }

    /// Load a schema from a YAML mapping of label to column rules.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| GeniusError::io(path, e))?;
        let schema = serde_yaml::from_reader(BufReader::new(file))?;
        Ok(schema)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn columns(&self) -> &IndexMap<String, SchemaColumn> {
        &self.columns
    }

    pub fn get(&self, label: &str) -> Option<&SchemaColumn> {
        self.columns.get(label)
    }

    /// Check every row of `dataset`. Columns named in the schema but missing
    /// from the dataset are an error.
    pub fn violations(&self, dataset: &Dataset) -> Result<SchemaViolations> {
        let mut failing = vec![false; dataset.row_count()];
        let mut per_column = IndexMap::new();

        for (label, rule) in &self.columns {
            let col = dataset.require_column(label)?;
            let mut seen: HashSet<&str> = HashSet::new();
            let mut count = 0;
            for (row, value) in dataset.column_values(col).enumerate() {
                let duplicate = rule.unique && value.is_some_and(|v| !seen.insert(v));
                if duplicate || !rule.evaluate(value) {
                    failing[row] = true;
                    count += 1;
                }
            }
            per_column.insert(label.clone(), count);
        }

        let rows = failing
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.then_some(i))
            .collect();
        Ok(SchemaViolations { rows, per_column })
    }
}
