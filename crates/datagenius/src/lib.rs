//! datagenius: staged cleaning for messy tabular data.
//!
//! Spreadsheets exported from reporting tools rarely arrive as clean tables.
//! datagenius runs a dataset through four stages of transmutations:
//!
//! - **Preprocess**: find the header row, drop blank and subtotal rows,
//!   normalize whitespace
//! - **Explore**: report on uniques, nulls and probable types
//! - **Clean**: repair typos, complete clusters, parse names, enforce a schema
//! - **Reformat**: map columns onto a target template
//!
//! Every transmutation returns a [`Report`]; rows it removes are kept as
//! rejects rather than discarded.
//!
//! # Example
//!
//! ```no_run
//! use datagenius::{Genius, Parser};
//!
//! let (dataset, _source) = Parser::new().parse_file("sales.csv").unwrap();
//! let outcome = Genius::new().go(dataset).unwrap();
//!
//! println!("Rows kept: {}", outcome.dataset.row_count());
//! println!("Rows rejected: {}", outcome.metadata.total_rejected());
//! ```

pub mod config;
pub mod error;
pub mod frame;
pub mod guides;
pub mod input;
pub mod names;
pub mod numerics;
pub mod plan;
pub mod schema;
pub mod stages;
pub mod strings;
pub mod supplement;
pub mod transmutation;

mod genius;

pub use crate::genius::{Genius, GeniusMetadata, GeniusOutcome};
pub use config::GeniusConfig;
pub use error::{GeniusError, Result};
pub use frame::{Cell, Dataset, Header};
pub use guides::{CleaningGuide, RedistributionGuide, SupplementGuide};
pub use input::{write_dataset, OutputFormat, Parser, SourceMetadata};
pub use plan::PipelinePlan;
pub use schema::{DataType, Schema, SchemaColumn};
pub use supplement::supplement;
pub use transmutation::{Report, Stage, Transmutation};
