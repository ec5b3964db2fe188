//! Guides: declarative instructions consumed by clean and supplement steps.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;

use crate::error::{GeniusError, Result};

// =============================================================================
// Cleaning
// =============================================================================

/// One or more source values.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// Maps typo'd or variant values to a canonical replacement.
///
/// In YAML each key is a replacement and each value the variant (or list of
/// variants) it replaces:
///
/// ```yaml
/// copper: cu
/// small: [sm, s]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "IndexMap<String, OneOrMany>")]
pub struct CleaningGuide {
    lookup: HashMap<String, String>,
}

impl CleaningGuide {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every value in `variants` with `replacement`.
    pub fn with_rule<S: Into<String>>(
        mut self,
        variants: impl IntoIterator<Item = S>,
        replacement: impl Into<String>,
    ) -> Self {
        let replacement = replacement.into();
        for v in variants {
            self.lookup.insert(v.into(), replacement.clone());
        }
        self
    }

    /// The replacement for `value`, if the guide has one.
    pub fn lookup(&self, value: &str) -> Option<&str> {
        self.lookup.get(value).map(|s| s.as_str())
    }

    /// The replacement for `value`, or `value` itself.
    pub fn convert(&self, value: &str) -> String {
        self.lookup(value).unwrap_or(value).to_string()
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}

impl From<IndexMap<String, OneOrMany>> for CleaningGuide {
    fn from(map: IndexMap<String, OneOrMany>) -> Self {
        map.into_iter()
            .fold(CleaningGuide::new(), |g, (replacement, variants)| {
                g.with_rule(variants.into_vec(), replacement)
            })
    }
}

// =============================================================================
// Redistribution
// =============================================================================

/// How a redistributed value lands in its destination column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedistributionMode {
    /// Replace whatever is there.
    Overwrite,
    /// Join onto the existing value with a space.
    Append,
    /// Only fill a null destination.
    FillNa,
}

impl FromStr for RedistributionMode {
    type Err = GeniusError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "overwrite" => Ok(RedistributionMode::Overwrite),
            "append" => Ok(RedistributionMode::Append),
            "fillna" => Ok(RedistributionMode::FillNa),
            other => Err(GeniusError::InvalidGuide(format!(
                "Invalid mode: {}. Must be one of overwrite, append, fillna",
                other
            ))),
        }
    }
}

impl fmt::Display for RedistributionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RedistributionMode::Overwrite => "overwrite",
            RedistributionMode::Append => "append",
            RedistributionMode::FillNa => "fillna",
        })
    }
}

/// Moves values matching any pattern into another column.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawRedistribution")]
pub struct RedistributionGuide {
    patterns: Vec<Regex>,
    pub destination: String,
    pub mode: RedistributionMode,
}

impl RedistributionGuide {
    pub fn new<S: AsRef<str>>(
        patterns: &[S],
        destination: impl Into<String>,
        mode: RedistributionMode,
    ) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns,
            destination: destination.into(),
            mode,
        })
    }

    /// Whether `value` should move.
    pub fn matches(&self, value: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(value))
    }

    /// Combine a moving value with the destination's current value.
    pub fn merge(&self, existing: Option<&str>, incoming: &str) -> Option<String> {
        match (self.mode, existing) {
            (RedistributionMode::Overwrite, _) | (_, None) => Some(incoming.to_string()),
            (RedistributionMode::Append, Some(cur)) => Some(format!("{} {}", cur, incoming)),
            (RedistributionMode::FillNa, Some(_)) => None,
        }
    }
}

#[derive(Deserialize)]
struct RawRedistribution {
    patterns: Vec<String>,
    destination: String,
    #[serde(default = "default_mode")]
    mode: String,
}

fn default_mode() -> String {
    "overwrite".to_string()
}

impl TryFrom<RawRedistribution> for RedistributionGuide {
    type Error = GeniusError;

    fn try_from(raw: RawRedistribution) -> Result<Self> {
        RedistributionGuide::new(&raw.patterns, raw.destination, raw.mode.parse()?)
    }
}

// =============================================================================
// Supplement
// =============================================================================

/// Similarity threshold used when an inexact guide gives none.
pub const DEFAULT_THRESHOLD: f64 = 0.9;

/// Instructions for joining one dataset onto another.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawSupplementGuide")]
pub struct SupplementGuide {
    /// Columns compared between the datasets.
    pub on: Vec<String>,
    /// Only rows whose column holds one of the listed values take part.
    /// Empty means every row.
    pub conditions: IndexMap<String, Vec<String>>,
    /// Minimum similarity per `on` column. Only used for inexact joins.
    pub thresholds: Vec<f64>,
    /// Columns that must match exactly before similarity is considered.
    pub block: Vec<String>,
    /// Fuzzy (similarity) matching rather than exact equality.
    pub inexact: bool,
}

impl SupplementGuide {
    /// An exact join on `on`.
    pub fn new<S: Into<String>>(on: impl IntoIterator<Item = S>) -> Self {
        Self {
            on: on.into_iter().map(Into::into).collect(),
            conditions: IndexMap::new(),
            thresholds: Vec::new(),
            block: Vec::new(),
            inexact: false,
        }
    }

    /// A fuzzy join on `on` with the default threshold for every column.
    pub fn inexact<S: Into<String>>(on: impl IntoIterator<Item = S>) -> Self {
        let mut guide = Self::new(on);
        guide.thresholds = vec![DEFAULT_THRESHOLD; guide.on.len()];
        guide.inexact = true;
        guide
    }

    /// Set per-column thresholds, which makes the join inexact.
    pub fn with_thresholds(mut self, thresholds: Vec<f64>) -> Result<Self> {
        self.thresholds = thresholds;
        self.inexact = true;
        self.validate()?;
        Ok(self)
    }

    pub fn with_condition<S: Into<String>>(
        mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        self.conditions
            .insert(column.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_block<S: Into<String>>(mut self, block: impl IntoIterator<Item = S>) -> Self {
        self.block = block.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.on.is_empty() {
            return Err(GeniusError::InvalidGuide(
                "a supplement guide needs at least one `on` column".to_string(),
            ));
        }
        if self.inexact && self.thresholds.len() != self.on.len() {
            return Err(GeniusError::InvalidGuide(format!(
                "{} thresholds given for {} `on` columns",
                self.thresholds.len(),
                self.on.len()
            )));
        }
        if let Some(t) = self.thresholds.iter().find(|t| !(0.0..=1.0).contains(*t)) {
            return Err(GeniusError::InvalidGuide(format!(
                "threshold {} is outside 0..=1",
                t
            )));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RawSupplementGuide {
    on: OneOrMany,
    #[serde(default)]
    conditions: IndexMap<String, OneOrMany>,
    #[serde(default)]
    thresholds: Option<Vec<f64>>,
    #[serde(default)]
    block: Vec<String>,
    #[serde(default)]
    inexact: bool,
}

impl TryFrom<RawSupplementGuide> for SupplementGuide {
    type Error = GeniusError;

    fn try_from(raw: RawSupplementGuide) -> Result<Self> {
        let on = raw.on.into_vec();
        let mut guide = match (raw.thresholds, raw.inexact) {
            (Some(t), _) => SupplementGuide::new(on).with_thresholds(t)?,
            (None, true) => SupplementGuide::inexact(on),
            (None, false) => SupplementGuide::new(on),
        };
        for (column, values) in raw.conditions {
            guide = guide.with_condition(column, values.into_vec());
        }
        guide = guide.with_block(raw.block);
        guide.validate()?;
        Ok(guide)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleaning_guide_convert() {
        let g = CleaningGuide::new()
            .with_rule(["cu"], "copper")
            .with_rule(["sm", "s"], "small");
        assert_eq!(g.convert("cu"), "copper");
        assert_eq!(g.convert("s"), "small");
        assert_eq!(g.convert("steel"), "steel");
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn test_cleaning_guide_from_yaml() {
        let g: CleaningGuide = serde_yaml::from_str("copper: cu\nsmall: [sm, s]\n").unwrap();
        assert_eq!(g.lookup("sm"), Some("small"));
        assert_eq!(g.lookup("cu"), Some("copper"));
        assert_eq!(g.lookup("copper"), None);
    }

    #[test]
    fn test_redistribution_mode_parse() {
        assert_eq!("fillna".parse::<RedistributionMode>().unwrap(), RedistributionMode::FillNa);
        let err = "replace".parse::<RedistributionMode>().unwrap_err();
        assert!(err.to_string().contains("Invalid mode: replace"));
    }

    #[test]
    fn test_redistribution_merge() {
        let g = RedistributionGuide::new(&[r"^\d+$"], "qty", RedistributionMode::Append).unwrap();
        assert!(g.matches("12"));
        assert!(!g.matches("12a"));
        assert_eq!(g.merge(Some("a"), "b"), Some("a b".to_string()));
        assert_eq!(g.merge(None, "b"), Some("b".to_string()));
        let g = RedistributionGuide::new(&["x"], "d", RedistributionMode::FillNa).unwrap();
        assert_eq!(g.merge(Some("a"), "x"), None);
    }

    #[test]
    fn test_redistribution_from_yaml_bad_mode() {
        let r: std::result::Result<RedistributionGuide, _> =
            serde_yaml::from_str("patterns: [x]\ndestination: d\nmode: smash\n");
        assert!(r.is_err());
    }

    #[test]
    fn test_supplement_guide_defaults() {
        let g = SupplementGuide::inexact(["a", "b", "c"]);
        assert_eq!(g.thresholds[0], 0.9);
        assert!(g.validate().is_ok());
        assert!(SupplementGuide::new(["a"]).with_thresholds(vec![0.5, 0.6]).is_err());
        assert!(SupplementGuide::new(Vec::<String>::new()).validate().is_err());
    }

    #[test]
    fn test_supplement_guide_from_yaml() {
        let g: SupplementGuide = serde_yaml::from_str(
            "on: location\nthresholds: [0.7]\nconditions:\n  region: Northern\nblock: [region]\n",
        )
        .unwrap();
        assert!(g.inexact);
        assert_eq!(g.on, vec!["location"]);
        assert_eq!(g.conditions["region"], vec!["Northern"]);
        assert_eq!(g.block, vec!["region"]);
    }
}
