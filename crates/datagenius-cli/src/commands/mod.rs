//! CLI command implementations.

pub mod explore;
pub mod names;
pub mod run;
pub mod supplement;

use std::path::{Path, PathBuf};

use colored::Colorize;
use datagenius::plan::ExplorePlan;
use datagenius::{Dataset, Genius, GeniusConfig, Parser, PipelinePlan, SourceMetadata};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Load a configuration file, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<GeniusConfig, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(p) => GeniusConfig::from_yaml_file(p)?,
        None => GeniusConfig::default(),
    })
}

/// Read a data file with the configured delimiter and null values.
pub fn read_dataset(
    file: &Path,
    config: &GeniusConfig,
) -> Result<(Dataset, SourceMetadata), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    Ok(Parser::with_config(config.parser_config()).parse_file(file)?)
}

/// Preprocessing only: whitespace, header detection and gap cleansing.
pub fn preprocess_plan() -> PipelinePlan {
    PipelinePlan {
        explore: ExplorePlan::disabled(),
        ..PipelinePlan::default()
    }
}

/// Read a file and run preprocessing over it.
pub fn read_preprocessed(
    file: &Path,
    config: &GeniusConfig,
) -> Result<Dataset, Box<dyn std::error::Error>> {
    let (dataset, _) = read_dataset(file, config)?;
    let genius = Genius::with_config(config.clone()).with_plan(&preprocess_plan())?;
    Ok(genius.go(dataset)?.dataset)
}

/// `<dir>/<stem>.<tag>.<ext>` next to `file`.
pub fn sibling_path(file: &Path, tag: &str, ext: &str) -> PathBuf {
    let stem = file.file_stem().unwrap_or_default().to_string_lossy();
    file.with_file_name(format!("{}.{}.{}", stem, tag, ext))
}

pub fn print_saved(path: &Path) {
    println!(
        "{} {}",
        "Saved to".green().bold(),
        path.display().to_string().white()
    );
}
