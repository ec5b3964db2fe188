//! The transmutation abstraction: one step of a cleaning pipeline.
//!
//! Every transmutation belongs to a [`Stage`] and has a priority. The runner
//! executes stages in order and, within a stage, higher priorities first.
//! Each run yields a [`Report`] with column-keyed metadata and, when rows
//! were removed, the rejected rows.

mod report;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::frame::Dataset;

pub use report::Report;

/// Priority given to transmutations that do not ask for one.
pub const DEFAULT_PRIORITY: u8 = 10;

/// A named group of transmutations. Stages run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Locate the header, drop junk rows, normalize text.
    Preprocess,
    /// Report on the data without changing it.
    Explore,
    /// Repair, complete and validate values.
    Clean,
    /// Reshape into the target layout.
    Reformat,
}

impl Stage {
    /// Every stage in execution order.
    pub const ALL: [Stage; 4] = [Stage::Preprocess, Stage::Explore, Stage::Clean, Stage::Reformat];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Preprocess => "preprocess",
            Stage::Explore => "explore",
            Stage::Clean => "clean",
            Stage::Reformat => "reformat",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single dataset transformation or report.
pub trait Transmutation: Send + Sync {
    /// Name used in reports and logs.
    fn name(&self) -> &str;

    /// Stage this transmutation runs in.
    fn stage(&self) -> Stage;

    /// Higher priorities run earlier within a stage.
    fn priority(&self) -> u8 {
        DEFAULT_PRIORITY
    }

    /// Apply the transmutation in place.
    fn transmute(&self, dataset: &mut Dataset) -> Result<Report>;
}

/// Sort by stage, then by descending priority. Ties keep registration order.
pub fn order_transmutations(transmutations: &mut [Box<dyn Transmutation>]) {
    transmutations.sort_by_key(|t| (t.stage(), std::cmp::Reverse(t.priority())));
}
