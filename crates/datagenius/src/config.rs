//! Library-wide configuration, loadable from YAML.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GeniusError, Result};
use crate::input::ParserConfig;

/// Cell texts read as null unless configured otherwise.
pub const DEFAULT_NULL_VALUES: [&str; 4] = ["", "nan", "null", "n/a"];

/// Default labels for the columns produced by name parsing.
pub const DEFAULT_NAME_COLUMNS: [&str; 5] = ["prefix", "fname", "mname", "lname", "suffix"];

/// Configuration for a [`crate::Genius`] run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeniusConfig {
    /// Cell texts read as null (case-insensitive, after trimming).
    pub null_values: Vec<String>,
    /// Field delimiter (None = auto-detect).
    pub delimiter: Option<char>,
    /// Labels for prefix, first, middle, last and suffix name columns.
    pub name_columns: Vec<String>,
    /// Extra name patterns merged into the built-in lists.
    pub custom_pattern_file: Option<PathBuf>,
}

impl Default for GeniusConfig {
    fn default() -> Self {
        Self {
            null_values: DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect(),
            delimiter: None,
            name_columns: DEFAULT_NAME_COLUMNS.iter().map(|s| s.to_string()).collect(),
            custom_pattern_file: None,
        }
    }
}

impl GeniusConfig {
    /// Load and validate a configuration file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| GeniusError::io(path, e))?;
        let config: GeniusConfig = serde_yaml::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        validate_name_columns(&self.name_columns)?;
        if let Some(d) = self.delimiter {
            if !d.is_ascii() {
                return Err(GeniusError::Config(format!(
                    "delimiter must be a single ASCII character, got '{}'",
                    d
                )));
            }
        }
        Ok(())
    }

    /// Parser settings implied by this configuration.
    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            delimiter: self.delimiter.map(|c| c as u8),
            null_values: self.null_values.clone(),
            ..ParserConfig::default()
        }
    }
}

/// Name columns must be exactly five labels.
pub fn validate_name_columns<S: AsRef<str>>(labels: &[S]) -> Result<()> {
    if labels.len() != DEFAULT_NAME_COLUMNS.len() {
        return Err(GeniusError::Config(format!(
            "name_columns must contain exactly {} labels, got {}",
            DEFAULT_NAME_COLUMNS.len(),
            labels.len()
        )));
    }
    Ok(())
}
