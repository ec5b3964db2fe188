//! Tabular data model: headers and datasets.

mod dataset;
mod header;

pub use dataset::{row, Cell, Dataset};
pub use header::{standardize_label, Header};
