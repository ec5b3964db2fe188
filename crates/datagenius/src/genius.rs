//! The pipeline runner.

use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::config::GeniusConfig;
use crate::error::{GeniusError, Result};
use crate::frame::Dataset;
use crate::plan::PipelinePlan;
use crate::stages::{
    CleanseGaps, CountNulls, CountUniques, DetectHeader, NormalizeWhitespace, TypesReport,
    UniquesReport,
};
use crate::transmutation::{order_transmutations, Report, Stage, Transmutation};

/// Everything the pipeline reported, in execution order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GeniusMetadata {
    pub reports: Vec<Report>,
}

impl GeniusMetadata {
    /// The first report produced by the transmutation called `name`.
    pub fn report(&self, name: &str) -> Option<&Report> {
        self.reports.iter().find(|r| r.transmutation == name)
    }

    /// Reports from one stage.
    pub fn stage_reports(&self, stage: Stage) -> impl Iterator<Item = &Report> {
        self.reports.iter().filter(move |r| r.stage == stage)
    }

    pub fn total_rejected(&self) -> usize {
        self.reports.iter().map(|r| r.rejected_rows).sum()
    }

    /// Every rejected row across the run, or None when nothing was rejected.
    pub fn rejects(&self) -> Option<Dataset> {
        let parts: Vec<Dataset> = self
            .reports
            .iter()
            .filter_map(|r| r.rejects.clone())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(Dataset::concat(&parts))
        }
    }
}

/// Result of [`Genius::go`].
#[derive(Debug, Clone)]
pub struct GeniusOutcome {
    pub dataset: Dataset,
    pub metadata: GeniusMetadata,
    /// Row index of the detected header in the raw input, if one was found.
    pub header_idx: Option<usize>,
}

/// Runs an ordered set of transmutations over a dataset.
pub struct Genius {
    config: GeniusConfig,
    transmutations: Vec<Box<dyn Transmutation>>,
}

impl Default for Genius {
    fn default() -> Self {
        Self::new()
    }
}

/// Whitespace, header and gap preprocessing followed by every explore report.
fn default_pipeline() -> Vec<Box<dyn Transmutation>> {
    vec![
        Box::new(NormalizeWhitespace),
        Box::new(DetectHeader::new()),
        Box::new(CleanseGaps::default()),
        Box::new(CountUniques),
        Box::new(CountNulls),
        Box::new(TypesReport),
        Box::new(UniquesReport),
    ]
}

impl Genius {
    /// The default pipeline with default configuration.
    pub fn new() -> Self {
        Self::with_config(GeniusConfig::default())
    }

    /// The default pipeline with custom configuration.
    pub fn with_config(config: GeniusConfig) -> Self {
        let mut transmutations = default_pipeline();
        order_transmutations(&mut transmutations);
        Self {
            config,
            transmutations,
        }
    }

    /// No transmutations at all.
    pub fn empty() -> Self {
        Self {
            config: GeniusConfig::default(),
            transmutations: Vec::new(),
        }
    }

    /// The pipeline a plan describes, with default configuration.
    pub fn from_plan(plan: &PipelinePlan) -> Result<Self> {
        Self::empty().with_plan(plan)
    }

    /// Replace the pipeline with the one `plan` describes, built against this
    /// runner's configuration.
    pub fn with_plan(mut self, plan: &PipelinePlan) -> Result<Self> {
        let mut transmutations = plan.build(&self.config)?;
        order_transmutations(&mut transmutations);
        self.transmutations = transmutations;
        Ok(self)
    }

    /// Swap the configuration, keeping the current pipeline.
    pub fn configured(mut self, config: GeniusConfig) -> Self {
        self.config = config;
        self
    }

    /// Register an extra transmutation.
    pub fn with_transmutation(mut self, transmutation: impl Transmutation + 'static) -> Self {
        self.transmutations.push(Box::new(transmutation));
        order_transmutations(&mut self.transmutations);
        self
    }

    pub fn config(&self) -> &GeniusConfig {
        &self.config
    }

    /// Transmutation names in execution order.
    pub fn transmutation_names(&self) -> Vec<&str> {
        self.transmutations.iter().map(|t| t.name()).collect()
    }

    /// Run every transmutation registered for `stage`.
    pub fn run_stage(&self, stage: Stage, dataset: &mut Dataset) -> Result<Vec<Report>> {
        let _span = info_span!("stage", %stage).entered();
        let mut reports = Vec::new();
        for t in self.transmutations.iter().filter(|t| t.stage() == stage) {
            debug!(transmutation = t.name(), priority = t.priority(), "running");
            let report = t.transmute(dataset).map_err(|e| GeniusError::Transmutation {
                name: t.name().to_string(),
                message: e.to_string(),
            })?;
            if report.rejected_rows > 0 {
                debug!(transmutation = t.name(), rejected = report.rejected_rows, "rows rejected");
            }
            reports.push(report);
        }
        info!(rows = dataset.row_count(), columns = dataset.column_count(), "stage complete");
        Ok(reports)
    }

    /// Run all stages in order.
    pub fn go(&self, mut dataset: Dataset) -> Result<GeniusOutcome> {
        let mut metadata = GeniusMetadata::default();
        for stage in Stage::ALL {
            if !self.transmutations.iter().any(|t| t.stage() == stage) {
                debug!(%stage, "no transmutations; skipping");
                continue;
            }
            let reports = self.run_stage(stage, &mut dataset)?;
            metadata.reports.extend(reports);
        }

        let header_idx = metadata
            .report("detect_header")
            .and_then(|r| r.count("header_idx"));
        info!(
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            rejected = metadata.total_rejected(),
            "pipeline complete"
        );
        Ok(GeniusOutcome {
            dataset,
            metadata,
            header_idx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::row;
    use crate::stages::{CleanNumericTypos, RejectIncompleteRows};

    fn raw_sheet() -> Dataset {
        Dataset::from_records(vec![
            row(&["Sales Report", "", ""]),
            row(&["", "", ""]),
            row(&["id", "product", "amount"]),
            row(&["1", " widget ", "1O0"]),
            row(&["", "", ""]),
            row(&["2", "gadget", "2.5"]),
            row(&["", "", "3"]),
        ])
    }

    #[test]
    fn test_default_pipeline() {
        let genius = Genius::new();
        assert_eq!(genius.transmutation_names()[0], "detect_header");
        let outcome = genius.go(raw_sheet()).unwrap();

        assert_eq!(outcome.header_idx, Some(2));
        assert_eq!(outcome.dataset.header, vec!["id", "product", "amount"]);
        assert_eq!(outcome.dataset.row_count(), 3);
        assert_eq!(outcome.dataset.get(0, 1), Some("widget"));

        let rejects = outcome.metadata.rejects().unwrap();
        assert_eq!(rejects.row_count(), 3);
        assert!(outcome.metadata.report("types_report").is_some());
    }

    #[test]
    fn test_extra_transmutations_and_stage_order() {
        let genius = Genius::new()
            .with_transmutation(RejectIncompleteRows::new(["id"]))
            .with_transmutation(CleanNumericTypos::new(["amount"]));
        let outcome = genius.go(raw_sheet()).unwrap();
        assert_eq!(outcome.dataset.row_count(), 2);
        assert_eq!(outcome.dataset.get(0, 2), Some("10"));

        let stages: Vec<Stage> = outcome.metadata.reports.iter().map(|r| r.stage).collect();
        let mut sorted = stages.clone();
        sorted.sort();
        assert_eq!(stages, sorted);
        assert_eq!(outcome.metadata.stage_reports(Stage::Clean).count(), 2);
    }

    #[test]
    fn test_empty_genius_is_identity() {
        let ds = raw_sheet();
        let outcome = Genius::empty().go(ds.clone()).unwrap();
        assert_eq!(outcome.dataset, ds);
        assert!(outcome.metadata.reports.is_empty());
        assert_eq!(outcome.header_idx, None);
        assert!(outcome.metadata.rejects().is_none());
    }

    #[test]
    fn test_failure_names_transmutation() {
        let genius = Genius::empty().with_transmutation(RejectIncompleteRows::new(["missing"]));
        let err = genius.go(raw_sheet()).unwrap_err();
        match err {
            GeniusError::Transmutation { name, .. } => assert_eq!(name, "reject_incomplete_rows"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_plan() {
        let plan = PipelinePlan::from_yaml_str("explore:\n  uniques_report: false\nclean:\n  required: [product]").unwrap();
        let genius = Genius::from_plan(&plan).unwrap();
        assert!(!genius.transmutation_names().contains(&"uniques_report"));
        let outcome = genius.go(raw_sheet()).unwrap();
        assert_eq!(outcome.dataset.row_count(), 2);
        assert_eq!(outcome.metadata.report("reject_incomplete_rows").unwrap().rejected_rows, 1);
    }

    #[test]
    fn test_metadata_serializes() {
        let outcome = Genius::new().go(raw_sheet()).unwrap();
        let json = serde_json::to_value(&outcome.metadata).unwrap();
        assert_eq!(json["reports"][0]["transmutation"], "detect_header");
    }
}
