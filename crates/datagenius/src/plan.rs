//! Declarative pipelines loaded from YAML.
//!
//! A plan names the transmutations to run in each stage. Every section is
//! optional; an empty plan reproduces the default pipeline.
//!
//! ```yaml
//! preprocess:
//!   cleanse_gaps: { max_missing: 1 }
//! clean:
//!   required: [id]
//!   numeric_typos: [amount]
//!   names:
//!     - column: owner
//!       name_num: 1
//! reformat:
//!   template: [id, amount, fname1, lname1]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::config::GeniusConfig;
use crate::error::{GeniusError, Result};
use crate::guides::{CleaningGuide, OneOrMany, RedistributionGuide};
use crate::names::{NamePatterns, ParseNameTokens, ParseNames};
use crate::schema::Schema;
use crate::stages::{
    CleanNumericTypos, CleanseGaps, CleanseTypos, CompleteClusters, CountNulls, CountUniques,
    DetectHeader, EnforceSchema, FillDefaults, GapThreshold, NormalizeWhitespace, PadZeroNumerics,
    Redistribute, Reformat, RejectIncompleteRows, TypesReport, UniquesReport,
};
use crate::transmutation::Transmutation;

/// A full pipeline description.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelinePlan {
    pub preprocess: PreprocessPlan,
    pub explore: ExplorePlan,
    pub clean: CleanPlan,
    pub reformat: Option<ReformatPlan>,
}

fn enabled() -> bool {
    true
}

/// How the header row is found.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HeaderPlan {
    /// `true` searches for the header row, `false` keeps positional labels.
    Detect(bool),
    /// Fixed labels.
    Manual(Vec<String>),
}

impl Default for HeaderPlan {
    fn default() -> Self {
        HeaderPlan::Detect(true)
    }
}

/// Gap cleansing threshold as written in YAML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GapsPlan {
    pub min_cells: Option<usize>,
    pub max_missing: Option<usize>,
}

impl GapsPlan {
    pub fn threshold(&self) -> Result<GapThreshold> {
        match (self.min_cells, self.max_missing) {
            (Some(_), Some(_)) => Err(GeniusError::Config(
                "cleanse_gaps takes either min_cells or max_missing, not both".into(),
            )),
            (_, Some(n)) => Ok(GapThreshold::MaxMissing(n)),
            (Some(n), None) => Ok(GapThreshold::MinCells(n)),
            (None, None) => Ok(GapThreshold::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreprocessPlan {
    pub normalize_whitespace: bool,
    pub header: HeaderPlan,
    /// `null` disables gap cleansing.
    pub cleanse_gaps: Option<GapsPlan>,
}

impl Default for PreprocessPlan {
    fn default() -> Self {
        Self {
            normalize_whitespace: true,
            header: HeaderPlan::default(),
            cleanse_gaps: Some(GapsPlan::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExplorePlan {
    #[serde(default = "enabled")]
    pub count_uniques: bool,
    #[serde(default = "enabled")]
    pub count_nulls: bool,
    #[serde(default = "enabled")]
    pub types_report: bool,
    #[serde(default = "enabled")]
    pub uniques_report: bool,
}

impl Default for ExplorePlan {
    fn default() -> Self {
        Self {
            count_uniques: true,
            count_nulls: true,
            types_report: true,
            uniques_report: true,
        }
    }
}

impl ExplorePlan {
    /// Run no explore reports.
    pub fn disabled() -> Self {
        Self {
            count_uniques: false,
            count_nulls: false,
            types_report: false,
            uniques_report: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PadPlan {
    pub columns: Vec<String>,
    pub length: usize,
}

/// One name parsing step. Give `column` for full-name strings or `tokens`
/// for names split across columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamesPlan {
    pub column: Option<String>,
    pub tokens: Option<Vec<String>>,
    pub name_num: Option<u32>,
    pub include_name2: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanPlan {
    pub complete_clusters: Vec<String>,
    pub required: Vec<String>,
    pub typos: IndexMap<String, CleaningGuide>,
    pub numeric_typos: Vec<String>,
    pub redistribute: IndexMap<String, RedistributionGuide>,
    pub pad_zero_numerics: Option<PadPlan>,
    pub schema: Option<PathBuf>,
    pub names: Vec<NamesPlan>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReformatPlan {
    pub template: Vec<String>,
    pub mapping: IndexMap<String, OneOrMany>,
    pub defaults: IndexMap<String, String>,
}

impl PipelinePlan {
    /// Load a plan. A relative schema path is resolved against the plan's
    /// directory.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| GeniusError::io(path, e))?;
        let mut plan = Self::from_yaml_str(&text)?;
        if let (Some(schema), Some(dir)) = (&plan.clean.schema, path.parent()) {
            if schema.is_relative() {
                plan.clean.schema = Some(dir.join(schema));
            }
        }
        Ok(plan)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Instantiate every transmutation the plan names, in registration order.
    pub fn build(&self, config: &GeniusConfig) -> Result<Vec<Box<dyn Transmutation>>> {
        let mut out: Vec<Box<dyn Transmutation>> = Vec::new();
        self.build_preprocess(&mut out)?;
        self.build_explore(&mut out);
        self.build_clean(config, &mut out)?;
        if let Some(reformat) = &self.reformat {
            out.push(Box::new(Reformat::from_targets(
                reformat.template.clone(),
                reformat.mapping.clone(),
            )));
            if !reformat.defaults.is_empty() {
                out.push(Box::new(FillDefaults::new(reformat.defaults.clone())));
            }
        }
        debug!(count = out.len(), "pipeline plan built");
        Ok(out)
    }

    fn build_preprocess(&self, out: &mut Vec<Box<dyn Transmutation>>) -> Result<()> {
        let pre = &self.preprocess;
        if pre.normalize_whitespace {
            out.push(Box::new(NormalizeWhitespace));
        }
        match &pre.header {
            HeaderPlan::Detect(true) => out.push(Box::new(DetectHeader::new())),
            HeaderPlan::Detect(false) => {}
            HeaderPlan::Manual(labels) => out.push(Box::new(DetectHeader::manual(labels.clone()))),
        }
        if let Some(gaps) = &pre.cleanse_gaps {
            out.push(Box::new(CleanseGaps::new(gaps.threshold()?)));
        }
        Ok(())
    }

    fn build_explore(&self, out: &mut Vec<Box<dyn Transmutation>>) {
        let ex = &self.explore;
        if ex.count_uniques {
            out.push(Box::new(CountUniques));
        }
        if ex.count_nulls {
            out.push(Box::new(CountNulls));
        }
        if ex.types_report {
            out.push(Box::new(TypesReport));
        }
        if ex.uniques_report {
            out.push(Box::new(UniquesReport));
        }
    }

    fn build_clean(&self, config: &GeniusConfig, out: &mut Vec<Box<dyn Transmutation>>) -> Result<()> {
        let clean = &self.clean;
        if !clean.complete_clusters.is_empty() {
            out.push(Box::new(CompleteClusters::new(clean.complete_clusters.clone())));
        }
        for (column, guide) in &clean.redistribute {
            out.push(Box::new(Redistribute::new(column.clone(), guide.clone())));
        }
        if !clean.typos.is_empty() {
            out.push(Box::new(CleanseTypos::new(clean.typos.clone())));
        }
        if !clean.numeric_typos.is_empty() {
            out.push(Box::new(CleanNumericTypos::new(clean.numeric_typos.clone())));
        }
        if let Some(pad) = &clean.pad_zero_numerics {
            out.push(Box::new(PadZeroNumerics::new(pad.columns.clone(), pad.length)));
        }
        if !clean.names.is_empty() {
            let patterns = NamePatterns::load(config.custom_pattern_file.as_deref())?;
            for step in &clean.names {
                out.push(build_names(step, config, &patterns)?);
            }
        }
        if !clean.required.is_empty() {
            out.push(Box::new(RejectIncompleteRows::new(clean.required.clone())));
        }
        if let Some(path) = &clean.schema {
            out.push(Box::new(EnforceSchema::new(Schema::from_yaml_file(path)?)));
        }
        Ok(())
    }
}

fn build_names(
    step: &NamesPlan,
    config: &GeniusConfig,
    patterns: &NamePatterns,
) -> Result<Box<dyn Transmutation>> {
    match (&step.column, &step.tokens) {
        (Some(column), None) => {
            let mut t = ParseNames::new(column.clone())
                .with_patterns(patterns.clone())
                .with_name_columns(config.name_columns.clone())?
                .with_name2(step.include_name2);
            if let Some(n) = step.name_num {
                t = t.with_name_num(n);
            }
            Ok(Box::new(t))
        }
        (None, Some(tokens)) => {
            let mut t = ParseNameTokens::new(tokens.clone())?
                .with_patterns(patterns.clone())
                .with_name_columns(config.name_columns.clone())?
                .with_name2(step.include_name2);
            if let Some(n) = step.name_num {
                t = t.with_name_num(n);
            }
            Ok(Box::new(t))
        }
        _ => Err(GeniusError::Config(
            "each names entry needs exactly one of column or tokens".into(),
        )),
    }
}
