//! Declarative validation rules for cleaned tables.

mod column;
mod table;
mod types;

pub use column::SchemaColumn;
pub use table::{Schema, SchemaViolations};
pub use types::DataType;
