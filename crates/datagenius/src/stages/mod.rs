//! Built-in transmutations, grouped by the stage they run in.

pub mod clean;
pub mod explore;
pub mod preprocess;
pub mod reformat;

pub use clean::{
    CleanNumericTypos, CleanseTypos, CompleteClusters, EnforceSchema, PadZeroNumerics,
    Redistribute, RejectIncompleteRows,
};
pub use explore::{
    profile_field, CountNulls, CountUniques, ProbableType, TypeProfile, TypesReport,
    UniqueValues, UniquesProfile, UniquesReport,
};
pub use preprocess::{CleanseGaps, DetectHeader, GapThreshold, NormalizeWhitespace};
pub use reformat::{FillDefaults, Reformat};
