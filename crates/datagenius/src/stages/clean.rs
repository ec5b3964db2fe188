//! Clean stage: repair, complete and validate values.

use indexmap::IndexMap;
use tracing::warn;

use crate::error::Result;
use crate::frame::{Cell, Dataset};
use crate::guides::{CleaningGuide, RedistributionGuide};
use crate::numerics::{classify_numeric, clean_numeric_typo, NumericKind, ZeroNumeric};
use crate::schema::Schema;
use crate::transmutation::{Report, Stage, Transmutation};

/// Resolve labels to indices, skipping (with a warning) any that are absent.
fn present_columns<'a>(
    dataset: &Dataset,
    labels: &'a [String],
    transmutation: &str,
) -> Vec<(&'a str, usize)> {
    labels
        .iter()
        .filter_map(|label| match dataset.column_index(label) {
            Some(idx) => Some((label.as_str(), idx)),
            None => {
                warn!(transmutation, column = %label, "column not found, skipping");
                None
            }
        })
        .collect()
}

/// Apply `f` to every non-null cell of the column at `col`, counting the cells
/// it changed.
fn rewrite_column<F>(dataset: &mut Dataset, col: usize, mut f: F) -> usize
where
    F: FnMut(&str) -> Option<String>,
{
    let mut changed = 0;
    for row in dataset.rows_mut() {
        let Some(current) = row[col].as_deref() else {
            continue;
        };
        if let Some(new) = f(current) {
            if new != current {
                row[col] = Some(new);
                changed += 1;
            }
        }
    }
    changed
}

/// Forward-fill nulls in grouping columns.
///
/// Report-style sheets print a group label once and leave the following rows
/// blank; this copies the label down.
#[derive(Debug, Clone)]
pub struct CompleteClusters {
    columns: Vec<String>,
}

impl CompleteClusters {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl Transmutation for CompleteClusters {
    fn name(&self) -> &str {
        "complete_clusters"
    }

    fn stage(&self) -> Stage {
        Stage::Clean
    }

    fn transmute(&self, dataset: &mut Dataset) -> Result<Report> {
        let mut report = Report::new(self.name(), self.stage());
        for (label, col) in present_columns(dataset, &self.columns, self.name()) {
            let mut last: Cell = None;
            let mut filled = 0;
            for row in dataset.rows_mut() {
                if row[col].is_some() {
                    last = row[col].clone();
                } else if last.is_some() {
                    row[col] = last.clone();
                    filled += 1;
                }
            }
            report = report.with_count(label, filled);
        }
        Ok(report)
    }
}

/// Reject rows missing a value in any required column.
#[derive(Debug, Clone)]
pub struct RejectIncompleteRows {
    required: Vec<String>,
}

impl RejectIncompleteRows {
    pub fn new<S: Into<String>>(required: impl IntoIterator<Item = S>) -> Self {
        Self {
            required: required.into_iter().map(Into::into).collect(),
        }
    }
}

impl Transmutation for RejectIncompleteRows {
    fn name(&self) -> &str {
        "reject_incomplete_rows"
    }

    fn stage(&self) -> Stage {
        Stage::Clean
    }

    fn transmute(&self, dataset: &mut Dataset) -> Result<Report> {
        let cols = self
            .required
            .iter()
            .map(|label| dataset.require_column(label))
            .collect::<Result<Vec<_>>>()?;
        let rejects = dataset.retain_rows(|row| cols.iter().all(|&c| row[c].is_some()));
        let mut report = Report::new(self.name(), self.stage());
        for (label, &col) in self.required.iter().zip(&cols) {
            report = report.with_count(label.as_str(), rejects.null_count(col));
        }
        Ok(report.with_rejects(rejects))
    }
}

/// Replace variant spellings using a [`CleaningGuide`] per column.
#[derive(Debug, Clone)]
pub struct CleanseTypos {
    guides: IndexMap<String, CleaningGuide>,
}

impl CleanseTypos {
    pub fn new(guides: IndexMap<String, CleaningGuide>) -> Self {
        Self { guides }
    }
}

impl Transmutation for CleanseTypos {
    fn name(&self) -> &str {
        "cleanse_typos"
    }

    fn stage(&self) -> Stage {
        Stage::Clean
    }

    fn transmute(&self, dataset: &mut Dataset) -> Result<Report> {
        let labels: Vec<String> = self.guides.keys().cloned().collect();
        let mut report = Report::new(self.name(), self.stage());
        for (label, col) in present_columns(dataset, &labels, self.name()) {
            let guide = &self.guides[label];
            let changed = rewrite_column(dataset, col, |v| guide.lookup(v).map(str::to_string));
            report = report.with_count(label, changed);
        }
        Ok(report)
    }
}

/// Repair numbers mangled by stray characters (`10.1q`, `1,9`).
#[derive(Debug, Clone)]
pub struct CleanNumericTypos {
    columns: Vec<String>,
}

impl CleanNumericTypos {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl Transmutation for CleanNumericTypos {
    fn name(&self) -> &str {
        "clean_numeric_typos"
    }

    fn stage(&self) -> Stage {
        Stage::Clean
    }

    fn transmute(&self, dataset: &mut Dataset) -> Result<Report> {
        let mut report = Report::new(self.name(), self.stage());
        for (label, col) in present_columns(dataset, &self.columns, self.name()) {
            let changed = rewrite_column(dataset, col, |v| Some(clean_numeric_typo(v)));
            report = report.with_count(label, changed);
        }
        Ok(report)
    }
}

/// Move values that belong elsewhere (a phone number typed into a notes
/// column, say) into their proper column.
#[derive(Debug, Clone)]
pub struct Redistribute {
    column: String,
    guide: RedistributionGuide,
}

impl Redistribute {
    pub fn new(column: impl Into<String>, guide: RedistributionGuide) -> Self {
        Self {
            column: column.into(),
            guide,
        }
    }
}

impl Transmutation for Redistribute {
    fn name(&self) -> &str {
        "redistribute"
    }

    fn stage(&self) -> Stage {
        Stage::Clean
    }

    fn transmute(&self, dataset: &mut Dataset) -> Result<Report> {
        let source = dataset.require_column(&self.column)?;
        let dest = dataset.ensure_column(&self.guide.destination);
        let mut moved = 0;
        for row in dataset.rows_mut() {
            let Some(value) = row[source].as_deref() else {
                continue;
            };
            if !self.guide.matches(value) {
                continue;
            }
            if let Some(merged) = self.guide.merge(row[dest].as_deref(), value) {
                row[dest] = Some(merged);
                row[source] = None;
                moved += 1;
            }
        }
        Ok(Report::new(self.name(), self.stage())
            .with_count(self.column.as_str(), moved)
            .with_value("destination", self.guide.destination.clone().into())
            .with_value("mode", self.guide.mode.to_string().into()))
    }
}

/// Left-pad integer cells with zeros to a fixed width (zip codes, UPCs).
#[derive(Debug, Clone)]
pub struct PadZeroNumerics {
    columns: Vec<String>,
    length: usize,
}

impl PadZeroNumerics {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>, length: usize) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            length,
        }
    }
}

impl Transmutation for PadZeroNumerics {
    fn name(&self) -> &str {
        "pad_zero_numerics"
    }

    fn stage(&self) -> Stage {
        Stage::Clean
    }

    fn transmute(&self, dataset: &mut Dataset) -> Result<Report> {
        let mut report = Report::new(self.name(), self.stage());
        for (label, col) in present_columns(dataset, &self.columns, self.name()) {
            let changed = rewrite_column(dataset, col, |v| match classify_numeric(v) {
                Some(NumericKind::Integer | NumericKind::ZeroNumeric) if !v.starts_with('-') => {
                    ZeroNumeric::new(v).ok().map(|z| z.pad(self.length).as_str().to_string())
                }
                _ => None,
            });
            report = report.with_count(label, changed);
        }
        Ok(report)
    }
}

/// Reject rows that break a [`Schema`].
#[derive(Debug, Clone)]
pub struct EnforceSchema {
    schema: Schema,
}

impl EnforceSchema {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }
}

impl Transmutation for EnforceSchema {
    fn name(&self) -> &str {
        "enforce_schema"
    }

    fn stage(&self) -> Stage {
        Stage::Clean
    }

    fn transmute(&self, dataset: &mut Dataset) -> Result<Report> {
        let violations = self.schema.violations(dataset)?;
        let mut index = 0;
        let mut failing = violations.rows.iter().peekable();
        let rejects = dataset.retain_rows(|_| {
            let reject = failing.next_if_eq(&&index).is_some();
            index += 1;
            !reject
        });
        Ok(Report::new(self.name(), self.stage())
            .with_counts(violations.per_column)
            .with_rejects(rejects))
    }
}
