//! What a transmutation did.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use super::Stage;
use crate::frame::Dataset;

/// Metadata produced by one transmutation run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Name of the transmutation.
    pub transmutation: String,
    /// Stage it ran in.
    pub stage: Stage,
    /// Column-keyed (or otherwise keyed) results.
    pub metadata: IndexMap<String, Value>,
    /// Number of rows removed from the dataset.
    pub rejected_rows: usize,
    /// The removed rows themselves.
    #[serde(skip)]
    pub rejects: Option<Dataset>,
}

impl Report {
    pub fn new(transmutation: impl Into<String>, stage: Stage) -> Self {
        Self {
            transmutation: transmutation.into(),
            stage,
            metadata: IndexMap::new(),
            rejected_rows: 0,
            rejects: None,
        }
    }

    /// Record a count under `key`.
    pub fn with_count(self, key: impl Into<String>, count: usize) -> Self {
        self.with_value(key, Value::from(count))
    }

    /// Record an arbitrary value under `key`.
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Record a count for every entry of `counts`.
    pub fn with_counts<K: Into<String>>(mut self, counts: impl IntoIterator<Item = (K, usize)>) -> Self {
        for (k, n) in counts {
            self.metadata.insert(k.into(), Value::from(n));
        }
        self
    }

    /// Attach rejected rows. Empty datasets are not attached.
    pub fn with_rejects(mut self, rejects: Dataset) -> Self {
        if !rejects.is_empty() {
            self.rejected_rows = rejects.row_count();
            self.rejects = Some(rejects);
        }
        self
    }

    /// A count recorded under `key`, if any.
    pub fn count(&self, key: &str) -> Option<usize> {
        self.metadata.get(key).and_then(Value::as_u64).map(|n| n as usize)
    }

    /// Total of every count in the metadata.
    pub fn total_count(&self) -> usize {
        self.metadata
            .values()
            .filter_map(Value::as_u64)
            .map(|n| n as usize)
            .sum()
    }
}
