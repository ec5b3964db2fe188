//! Preprocess stage: turn a raw, report-like sheet into a plain table.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::frame::{Dataset, Header};
use crate::strings::{clean_whitespace, count_true_str};
use crate::transmutation::{Report, Stage, Transmutation};

/// Trim cells and collapse repeated spaces. Cells left blank become null.
#[derive(Debug, Clone, Default)]
pub struct NormalizeWhitespace;

impl Transmutation for NormalizeWhitespace {
    fn name(&self) -> &str {
        "normalize_whitespace"
    }

    fn stage(&self) -> Stage {
        Stage::Preprocess
    }

    fn transmute(&self, dataset: &mut Dataset) -> Result<Report> {
        let mut counts = vec![0usize; dataset.column_count()];
        for row in dataset.rows_mut() {
            for (col, cell) in row.iter_mut().enumerate() {
                let Some(text) = cell.as_deref() else {
                    continue;
                };
                let (changed, cleaned) = clean_whitespace(text);
                if changed {
                    counts[col] += 1;
                    *cell = if cleaned.is_empty() { None } else { Some(cleaned) };
                }
            }
        }
        let labels: Vec<String> = dataset.header.labels().to_vec();
        Ok(Report::new(self.name(), self.stage()).with_counts(labels.into_iter().zip(counts)))
    }
}

/// Locate the header row.
///
/// Without a manual header, the first row made entirely of non-numeric text
/// becomes the header and every row above it is rejected. A manual header
/// replaces the labels and keeps every row.
#[derive(Debug, Clone, Default)]
pub struct DetectHeader {
    manual: Option<Vec<String>>,
}

impl DetectHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use fixed labels instead of searching for a header row.
    pub fn manual<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        Self {
            manual: Some(labels.into_iter().map(Into::into).collect()),
        }
    }

    /// Index of the first row that looks like a header.
    pub fn find_header_row(dataset: &Dataset) -> Option<usize> {
        let width = dataset.column_count();
        dataset
            .rows()
            .iter()
            .position(|row| width > 0 && count_true_str(row) == width)
    }
}

impl Transmutation for DetectHeader {
    fn name(&self) -> &str {
        "detect_header"
    }

    fn stage(&self) -> Stage {
        Stage::Preprocess
    }

    fn priority(&self) -> u8 {
        11
    }

    fn transmute(&self, dataset: &mut Dataset) -> Result<Report> {
        let report = Report::new(self.name(), self.stage());

        if let Some(labels) = &self.manual {
            dataset.set_header(Header::new(labels))?;
            return Ok(report.with_value("header_idx", Value::Null));
        }

        let Some(idx) = Self::find_header_row(dataset) else {
            warn!("no header row found; keeping positional labels");
            return Ok(report.with_value("header_idx", Value::Null));
        };
        debug!(header_idx = idx, "header row located");

        let rejects = dataset.split_off_head(idx);
        let header_row = dataset.split_off_head(1);
        let labels: Vec<&str> = header_row.rows()[0]
            .iter()
            .map(|c| c.as_deref().unwrap_or(""))
            .collect();
        dataset.set_header(Header::new(labels))?;

        Ok(report
            .with_count("header_idx", idx)
            .with_rejects(rejects))
    }
}

/// How many filled cells a row needs to survive [`CleanseGaps`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapThreshold {
    /// At least this many non-null cells.
    MinCells(usize),
    /// At most this many null cells. `MaxMissing(1)` removes subtotal rows
    /// that only fill a figure column.
    MaxMissing(usize),
}

impl Default for GapThreshold {
    fn default() -> Self {
        GapThreshold::MinCells(1)
    }
}

impl GapThreshold {
    fn required(&self, width: usize) -> usize {
        match *self {
            GapThreshold::MinCells(n) => n,
            GapThreshold::MaxMissing(n) => width.saturating_sub(n),
        }
    }
}

/// Reject rows with too few filled cells: blank spacer rows by default, or
/// subtotal rows with a stricter threshold.
#[derive(Debug, Clone, Default)]
pub struct CleanseGaps {
    threshold: GapThreshold,
}

impl CleanseGaps {
    pub fn new(threshold: GapThreshold) -> Self {
        Self { threshold }
    }
}

impl Transmutation for CleanseGaps {
    fn name(&self) -> &str {
        "cleanse_gaps"
    }

    fn stage(&self) -> Stage {
        Stage::Preprocess
    }

    fn transmute(&self, dataset: &mut Dataset) -> Result<Report> {
        let required = self.threshold.required(dataset.column_count());
        let rejects = dataset.retain_rows(|row| Dataset::row_non_null_count(row) >= required);
        Ok(Report::new(self.name(), self.stage())
            .with_count("required_cells", required)
            .with_rejects(rejects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::row;

    fn gaps_totals() -> Dataset {
        Dataset::from_records(vec![
            row(&["Sales by Location Report", "", ""]),
            row(&["Grouping: Region", "", ""]),
            row(&["", "", ""]),
            row(&["", "", ""]),
            row(&["location", "region", "sales"]),
            row(&["Bayside Store", "Northern", "500"]),
            row(&["West Valley Store", "Northern", "300"]),
            row(&["", "", "800"]),
            row(&["Precioso Store", "Southern", "1000"]),
            row(&["Kalliope Store", "Southern", "200"]),
            row(&["", "", "1200"]),
        ])
    }

    #[test]
    fn test_normalize_whitespace() {
        let mut ds = Dataset::new(
            ["a", "b"],
            vec![row(&[" a bad  string ", "fine"]), row(&["   ", "x  y"])],
        );
        let report = NormalizeWhitespace.transmute(&mut ds).unwrap();
        assert_eq!(ds.get(0, 0), Some("a bad string"));
        assert_eq!(ds.get(1, 0), None);
        assert_eq!(ds.get(1, 1), Some("x y"));
        assert_eq!(report.count("a"), Some(2));
        assert_eq!(report.count("b"), Some(1));
    }

    #[test]
    fn test_detect_header_purges_pre_header_rows() {
        let mut ds = gaps_totals();
        let report = DetectHeader::new().transmute(&mut ds).unwrap();
        assert_eq!(ds.header, vec!["location", "region", "sales"]);
        assert_eq!(report.count("header_idx"), Some(4));
        assert_eq!(report.rejected_rows, 4);
        assert_eq!(ds.row_count(), 6);
        assert_eq!(ds.get(0, 0), Some("Bayside Store"));
    }

    #[test]
    fn test_detect_header_at_first_row() {
        let mut ds = Dataset::from_records(vec![row(&["id", "name"]), row(&["1", "a"])]);
        let report = DetectHeader::new().transmute(&mut ds).unwrap();
        assert_eq!(report.count("header_idx"), Some(0));
        assert_eq!(ds.header, vec!["id", "name"]);
        assert!(report.rejects.is_none());
    }

    #[test]
    fn test_detect_header_none_found() {
        let mut ds = Dataset::from_records(vec![row(&["1", "2"]), row(&["3", ""])]);
        let report = DetectHeader::new().transmute(&mut ds).unwrap();
        assert_eq!(report.metadata["header_idx"], Value::Null);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.header, vec!["0", "1"]);
    }

    #[test]
    fn test_manual_header() {
        let mut ds = Dataset::from_records(vec![row(&["1", "2"])]);
        DetectHeader::manual(["Id", "Count"]).transmute(&mut ds).unwrap();
        assert_eq!(ds.header, vec!["id", "count"]);
        assert_eq!(ds.row_count(), 1);
        assert!(DetectHeader::manual(["only"]).transmute(&mut ds).is_err());
    }

    #[test]
    fn test_cleanse_gaps_default_drops_blank_rows() {
        let mut ds = gaps_totals();
        let report = CleanseGaps::default().transmute(&mut ds).unwrap();
        assert_eq!(report.rejected_rows, 2);
        assert_eq!(ds.row_count(), 9);
    }

    #[test]
    fn test_cleanse_gaps_drops_subtotals() {
        let mut ds = gaps_totals();
        DetectHeader::new().transmute(&mut ds).unwrap();
        let report = CleanseGaps::new(GapThreshold::MaxMissing(1))
            .transmute(&mut ds)
            .unwrap();
        assert_eq!(report.rejected_rows, 2);
        assert_eq!(
            ds.column("location").unwrap(),
            vec![
                Some("Bayside Store"),
                Some("West Valley Store"),
                Some("Precioso Store"),
                Some("Kalliope Store")
            ]
        );
    }
}
