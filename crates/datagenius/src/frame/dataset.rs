//! The in-memory table every transmutation operates on.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::header::Header;
use crate::error::{GeniusError, Result};

/// A single cell. `None` is a null.
pub type Cell = Option<String>;

/// Tabular data: a header plus row-major cells.
///
/// Every row is kept exactly as wide as the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Column labels.
    pub header: Header,
    /// Row data (row-major order).
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    /// Create a dataset from labels and rows. Rows are padded or truncated to
    /// the header width.
    pub fn new<S: AsRef<str>>(
        labels: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Cell>>,
    ) -> Self {
        Self::with_header(Header::new(labels), rows)
    }

    /// Create a dataset from an already built header.
    pub fn with_header(header: Header, rows: Vec<Vec<Cell>>) -> Self {
        let width = header.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { header, rows }
    }

    /// Create a dataset from raw records with positional labels. Used for data
    /// whose header row has not been located yet.
    pub fn from_records(rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        Self::with_header(Header::generated(width), rows)
    }

    /// Replace the header. The new header must be as wide as the rows.
    pub fn set_header(&mut self, header: Header) -> Result<()> {
        if header.len() != self.header.len() {
            return Err(GeniusError::Config(format!(
                "header has {} labels but the data has {} columns",
                header.len(),
                self.header.len()
            )));
        }
        self.header = header;
        Ok(())
    }

    /// An empty dataset with the same columns as `self`.
    pub fn empty_like(&self) -> Self {
        Self {
            header: self.header.clone(),
            rows: Vec::new(),
        }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Mutable access to rows. Row widths stay fixed.
    pub fn rows_mut(&mut self) -> &mut [Vec<Cell>] {
        &mut self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<Cell>> {
        self.rows
    }

    /// Mutable access to every cell of every row.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.rows.iter_mut().flat_map(|r| r.iter_mut())
    }

    /// Find a column index by standardized or original label.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.header.index_of(label)
    }

    /// Like [`Dataset::column_index`] but errors on a missing column.
    pub fn require_column(&self, label: &str) -> Result<usize> {
        self.column_index(label)
            .ok_or_else(|| GeniusError::ColumnNotFound(label.to_string()))
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = Option<&str>> {
        self.rows
            .iter()
            .map(move |row| row.get(index).and_then(|c| c.as_deref()))
    }

    /// Get a column by label.
    pub fn column(&self, label: &str) -> Option<Vec<Option<&str>>> {
        let index = self.column_index(label)?;
        Some(self.column_values(index).collect())
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col)).and_then(|c| c.as_deref())
    }

    /// Set a specific cell value.
    pub fn set(&mut self, row: usize, col: usize, value: Cell) -> Result<()> {
        let len = self.rows.len();
        let width = self.header.len();
        let r = self
            .rows
            .get_mut(row)
            .ok_or(GeniusError::IndexOutOfRange { index: row, len })?;
        let cell = r
            .get_mut(col)
            .ok_or(GeniusError::IndexOutOfRange { index: col, len: width })?;
        *cell = value;
        Ok(())
    }

    /// Append a column. Missing values are padded with nulls. Returns the new
    /// column index.
    pub fn add_column(&mut self, label: impl Into<String>, values: Vec<Cell>) -> usize {
        self.header.append(label);
        let mut values = values.into_iter();
        for row in &mut self.rows {
            row.push(values.next().flatten());
        }
        self.header.len() - 1
    }

    /// Column index for `label`, appending an all-null column if absent.
    pub fn ensure_column(&mut self, label: &str) -> usize {
        match self.column_index(label) {
            Some(idx) => idx,
            None => self.add_column(label, Vec::new()),
        }
    }

    /// Drop a column by label.
    pub fn remove_column(&mut self, label: &str) -> Result<()> {
        let index = self.header.remove(label)?;
        for row in &mut self.rows {
            row.remove(index);
        }
        Ok(())
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.header.len(), None);
        self.rows.push(row);
    }

    /// Count of non-null cells in a column.
    pub fn non_null_count(&self, col: usize) -> usize {
        self.column_values(col).filter(|v| v.is_some()).count()
    }

    /// Count of null cells in a column.
    pub fn null_count(&self, col: usize) -> usize {
        self.row_count() - self.non_null_count(col)
    }

    /// Count of non-null cells in a row.
    pub fn row_non_null_count(row: &[Cell]) -> usize {
        row.iter().filter(|c| c.is_some()).count()
    }

    /// A new dataset holding clones of the rows at `indices`.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let rows = indices
            .iter()
            .filter_map(|&i| self.rows.get(i).cloned())
            .collect();
        Self {
            header: self.header.clone(),
            rows,
        }
    }

    /// Keep rows for which `keep` returns true. The removed rows are returned
    /// as a dataset sharing this header.
    pub fn retain_rows<F>(&mut self, mut keep: F) -> Dataset
    where
        F: FnMut(&[Cell]) -> bool,
    {
        let (kept, rejected): (Vec<_>, Vec<_>) =
            self.rows.drain(..).partition(|row| keep(row.as_slice()));
        self.rows = kept;
        Dataset {
            header: self.header.clone(),
            rows: rejected,
        }
    }

    /// Split off rows `0..at`, returning them. Rows from `at` on remain.
    pub fn split_off_head(&mut self, at: usize) -> Dataset {
        let at = at.min(self.rows.len());
        let head: Vec<_> = self.rows.drain(..at).collect();
        Dataset {
            header: self.header.clone(),
            rows: head,
        }
    }

    /// Concatenate datasets, aligning columns by label. Columns appear in the
    /// order they are first seen; cells missing from a dataset are null.
    pub fn concat(datasets: &[Dataset]) -> Dataset {
        let mut labels: Vec<String> = Vec::new();
        for ds in datasets {
            for label in ds.header.iter() {
                if !labels.iter().any(|l| l == label) {
                    labels.push(label.to_string());
                }
            }
        }

        let mut rows = Vec::new();
        for ds in datasets {
            let positions: Vec<Option<usize>> = labels
                .iter()
                .map(|l| ds.header.iter().position(|h| h == l))
                .collect();
            for row in &ds.rows {
                rows.push(
                    positions
                        .iter()
                        .map(|p| p.and_then(|i| row[i].clone()))
                        .collect(),
                );
            }
        }

        Dataset::new(labels, rows)
    }

    /// Rows as ordered label/value maps.
    pub fn records(&self) -> Vec<IndexMap<String, Cell>> {
        self.rows
            .iter()
            .map(|row| {
                self.header
                    .iter()
                    .map(str::to_string)
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }
}

/// Build a row of cells from string slices. Empty strings become nulls.
pub fn row<S: AsRef<str>>(values: &[S]) -> Vec<Cell> {
    values
        .iter()
        .map(|v| {
            let v = v.as_ref();
            if v.is_empty() { None } else { Some(v.to_string()) }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            ["id", "name"],
            vec![row(&["1", "Widget"]), row(&["2", ""]), row(&["3"])],
        )
    }

    #[test]
    fn test_rows_padded_to_header() {
        let ds = sample();
        assert_eq!(ds.rows()[2], vec![Some("3".to_string()), None]);
        assert_eq!(ds.null_count(1), 2);
        assert_eq!(ds.non_null_count(0), 3);
    }

    #[test]
    fn test_from_records_uses_widest_row() {
        let ds = Dataset::from_records(vec![row(&["a"]), row(&["a", "b", "c"])]);
        assert_eq!(ds.header, vec!["0", "1", "2"]);
        assert_eq!(ds.rows()[0].len(), 3);
    }

    #[test]
    fn test_get_and_set() {
        let mut ds = sample();
        assert_eq!(ds.get(0, 1), Some("Widget"));
        ds.set(1, 1, Some("Gadget".into())).unwrap();
        assert_eq!(ds.get(1, 1), Some("Gadget"));
        assert!(ds.set(9, 0, None).is_err());
    }

    #[test]
    fn test_retain_rows_returns_rejects() {
        let mut ds = sample();
        let rejects = ds.retain_rows(|r| r[1].is_some());
        assert_eq!(ds.row_count(), 1);
        assert_eq!(rejects.row_count(), 2);
        assert_eq!(rejects.header, ds.header);
    }

    #[test]
    fn test_add_and_remove_column() {
        let mut ds = sample();
        let idx = ds.add_column("Price", vec![Some("8.5".into())]);
        assert_eq!(idx, 2);
        assert_eq!(ds.column("price").unwrap(), vec![Some("8.5"), None, None]);
        ds.remove_column("name").unwrap();
        assert_eq!(ds.header, vec!["id", "price"]);
        assert_eq!(ds.get(0, 1), Some("8.5"));
    }

    #[test]
    fn test_concat_aligns_columns() {
        let a = Dataset::new(["a", "b"], vec![row(&["1", "2"])]);
        let b = Dataset::new(["b", "c"], vec![row(&["3", "4"])]);
        let c = Dataset::concat(&[a, b]);
        assert_eq!(c.header, vec!["a", "b", "c"]);
        assert_eq!(c.rows()[1], vec![None, Some("3".into()), Some("4".into())]);
    }

    #[test]
    fn test_records() {
        let recs = sample().records();
        assert_eq!(recs[0]["name"], Some("Widget".to_string()));
        assert_eq!(recs[1]["name"], None);
    }
}
