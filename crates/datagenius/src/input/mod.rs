//! Reading and writing delimited data files.

mod parser;
mod source;
mod writer;

pub use parser::{Parser, ParserConfig};
pub use source::SourceMetadata;
pub use writer::{write_dataset, write_delimited, write_delimited_to, write_json, OutputFormat};
