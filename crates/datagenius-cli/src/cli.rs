//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// datagenius: staged cleaning for messy spreadsheet data
#[derive(Parser)]
#[command(name = "datagenius")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the cleaning pipeline over a data file
    Run(RunArgs),

    /// Preprocess a file and report on each column
    Explore {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Library configuration (YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output the explore reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a column of personal names into components
    Names(NamesArgs),

    /// Join other files onto a base file, exactly or by similarity
    Supplement(SupplementArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Path to the data file (CSV/TSV)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Pipeline plan (YAML); the default pipeline runs without one
    #[arg(short, long)]
    pub plan: Option<PathBuf>,

    /// Library configuration (YAML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output path for cleaned data (default: <file>.clean.<format>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "csv")]
    pub format: OutputFormat,

    /// Write pipeline reports to this JSON file
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    /// Write rejected rows to this CSV file
    #[arg(long)]
    pub rejects: Option<PathBuf>,
}

#[derive(Args)]
pub struct NamesArgs {
    /// Path to the data file (CSV/TSV)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Column holding full names
    #[arg(short, long)]
    pub column: String,

    /// Always emit columns for a second person
    #[arg(long)]
    pub include_name2: bool,

    /// Number appended to output column labels
    #[arg(long)]
    pub name_num: Option<u32>,

    /// Library configuration (YAML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output path (default: <file>.names.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct SupplementArgs {
    /// Base data file
    #[arg(value_name = "BASE")]
    pub base: PathBuf,

    /// Files to join onto the base
    #[arg(value_name = "OTHER", required = true)]
    pub others: Vec<PathBuf>,

    /// Columns to join on
    #[arg(long, required = true, num_args = 1..)]
    pub on: Vec<String>,

    /// Similarity thresholds, one per --on column; enables inexact matching
    #[arg(long, num_args = 1..)]
    pub threshold: Vec<f64>,

    /// Columns that must match exactly before similarity is compared
    #[arg(long, num_args = 1..)]
    pub block: Vec<String>,

    /// Suffixes for colliding labels, one per other file
    #[arg(long, num_args = 1..)]
    pub suffix: Vec<String>,

    /// Output path (default: <base>.supplemented.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use csv, tsv, or json.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl From<OutputFormat> for datagenius::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => datagenius::OutputFormat::Csv,
            OutputFormat::Tsv => datagenius::OutputFormat::Tsv,
            OutputFormat::Json => datagenius::OutputFormat::Json,
        }
    }
}
