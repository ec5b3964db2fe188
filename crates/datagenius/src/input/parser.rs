//! Delimited text reader with delimiter detection.
//!
//! Files are read as raw records: spreadsheet exports often carry title rows
//! and blank lines above the real header, so locating the header is left to
//! the preprocess stage.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use super::source::SourceMetadata;
use crate::config::DEFAULT_NULL_VALUES;
use crate::error::{GeniusError, Result};
use crate::frame::{Cell, Dataset};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Maximum records to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
    /// Cell texts read as null, compared case-insensitively after trimming.
    pub null_values: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            max_rows: None,
            quote: b'"',
            null_values: DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Reads delimited files into a [`Dataset`].
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the dataset and source metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| GeniusError::io(path, e))?;
        let size_bytes = file
            .metadata()
            .map_err(|e| GeniusError::io(path, e))?
            .len();

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| GeniusError::io(path, e))?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };
        debug!(path = %path.display(), delimiter = %(delimiter as char).escape_default(), "parsing file");

        let dataset = self.parse_bytes(&contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        let source = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format,
            dataset.row_count(),
            dataset.column_count(),
        );

        Ok((dataset, source))
    }

    /// Parse in-memory text, detecting the delimiter unless configured.
    pub fn parse_str(&self, text: &str) -> Result<Dataset> {
        let bytes = text.as_bytes();
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes)?,
        };
        self.parse_bytes(bytes, delimiter)
    }

    /// Parse bytes directly. Ragged records are padded to the widest one.
    fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut records: Vec<Vec<Cell>> = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }
            let record = result?;
            records.push(record.iter().map(|s| self.to_cell(s)).collect());
        }

        if records.is_empty() {
            return Err(GeniusError::EmptyData("No records found".to_string()));
        }

        let dataset = Dataset::from_records(records);
        if dataset.column_count() == 0 {
            return Err(GeniusError::EmptyData("No columns found".to_string()));
        }
        Ok(dataset)
    }

    fn to_cell(&self, raw: &str) -> Cell {
        if self.is_null_value(raw) {
            None
        } else {
            Some(raw.to_string())
        }
    }

    /// Check if a value is one of the configured null markers.
    pub fn is_null_value(&self, value: &str) -> bool {
        let trimmed = value.trim();
        self.config
            .null_values
            .iter()
            .any(|n| n.trim().eq_ignore_ascii_case(trimmed))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(GeniusError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let max_count = counts.iter().copied().max().unwrap_or(0);
        if max_count == 0 {
            continue;
        }

        // Report-style files have title lines with few delimiters, so judge
        // consistency on the lines that carry the most.
        let full_lines = counts.iter().filter(|&&c| c == max_count).count();
        let consistent = counts.iter().all(|&c| c == max_count);

        // Tab delimiter gets a slight bonus as it's less common in actual data
        let score = if consistent {
            max_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else {
            max_count * 10 * full_lines
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_detect_delimiter_with_title_rows() {
        let data = b"Sales Report\nlocation;region;sales\nA;North;5\nB;South;6";
        assert_eq!(detect_delimiter(data).unwrap(), b';');
    }

    #[test]
    fn test_parse_keeps_all_records() {
        let parser = Parser::new();
        let ds = parser.parse_bytes(b"name,age\nAlice,30\nBob,", b',').unwrap();
        assert_eq!(ds.header, vec!["0", "1"]);
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.get(0, 0), Some("name"));
        assert_eq!(ds.get(2, 1), None);
    }

    #[test]
    fn test_ragged_records_padded() {
        let parser = Parser::new();
        let ds = parser.parse_str("Title\na,b,c\n1,2,3\n").unwrap();
        assert_eq!(ds.column_count(), 3);
        assert_eq!(ds.rows()[0], vec![Some("Title".to_string()), None, None]);
    }

    #[test]
    fn test_configured_null_values() {
        let parser = Parser::with_config(ParserConfig {
            null_values: vec!["".into(), "N/A".into()],
            ..ParserConfig::default()
        });
        assert!(parser.is_null_value("n/a"));
        assert!(parser.is_null_value("  "));
        assert!(!parser.is_null_value("0"));
        let ds = parser.parse_str("a,b\nN/A,1").unwrap();
        assert_eq!(ds.get(1, 0), None);
    }

    #[test]
    fn test_default_null_values() {
        let ds = Parser::new().parse_str("a,b\n1,nan\n2,NULL\n3, N/A \n4,none\n").unwrap();
        assert_eq!(ds.column_values(1).collect::<Vec<_>>(), vec![Some("b"), None, None, None, Some("none")]);
        assert_eq!(
            ParserConfig::default().null_values,
            crate::GeniusConfig::default().parser_config().null_values
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(Parser::new().parse_str("").is_err());
    }
}
