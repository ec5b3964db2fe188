//! Writing datasets and reports back to disk.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::{GeniusError, Result};
use crate::frame::Dataset;

/// Output formats for cleaned data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Tsv,
    /// An array of label/value records.
    Json,
}

impl OutputFormat {
    /// Pick a format from a file extension, defaulting to CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("tsv") | Some("tab") => OutputFormat::Tsv,
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Csv,
        }
    }
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| GeniusError::io(parent, e))?;
        }
    }
    let file = File::create(path).map_err(|e| GeniusError::io(path, e))?;
    Ok(BufWriter::new(file))
}

/// Write a dataset as delimited text with a header row. Nulls are written as
/// empty fields.
pub fn write_delimited_to<W: Write>(dataset: &Dataset, writer: W, delimiter: u8) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    csv_writer.write_record(dataset.header.iter())?;
    for row in dataset.rows() {
        csv_writer.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
    }
    csv_writer.flush().map_err(|e| GeniusError::io("<output>", e))?;
    Ok(())
}

/// Write a dataset to `path` as delimited text.
pub fn write_delimited(dataset: &Dataset, path: impl AsRef<Path>, delimiter: u8) -> Result<()> {
    let path = path.as_ref();
    write_delimited_to(dataset, create(path)?, delimiter)
}

/// Serialize any value to `path` as pretty JSON.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = create(path)?;
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush().map_err(|e| GeniusError::io(path, e))?;
    Ok(())
}

/// Write a dataset in the given format.
pub fn write_dataset(dataset: &Dataset, path: impl AsRef<Path>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Csv => write_delimited(dataset, path, b','),
        OutputFormat::Tsv => write_delimited(dataset, path, b'\t'),
        OutputFormat::Json => write_json(&dataset.records(), path),
    }
}
