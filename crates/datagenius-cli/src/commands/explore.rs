//! Explore command - preprocess a file and report on each column.

use std::path::PathBuf;

use colored::Colorize;
use serde_json::Value;

use datagenius::stages::profile_field;
use datagenius::{Genius, Report, Stage};

use super::{load_config, read_dataset, CommandResult};

pub fn run(file: PathBuf, config: Option<PathBuf>, json: bool) -> CommandResult {
    let config = load_config(config.as_deref())?;
    let (dataset, _) = read_dataset(&file, &config)?;
    let outcome = Genius::with_config(config).go(dataset)?;
    let reports: Vec<&Report> = outcome.metadata.stage_reports(Stage::Explore).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Exploring".cyan().bold(),
        file.display().to_string().white()
    );
    if let Some(idx) = outcome.header_idx {
        println!("Header found at row {}", idx);
    }
    println!(
        "{} rows, {} columns",
        outcome.dataset.row_count().to_string().white().bold(),
        outcome.dataset.column_count().to_string().white().bold()
    );
    println!();

    let find = |name: &str| reports.iter().copied().find(|r| r.transmutation == name);
    let (nulls, uniques, types, values) = (
        find("count_nulls"),
        find("count_uniques"),
        find("types_report"),
        find("uniques_report"),
    );

    println!(
        "  {:24} {:>8} {:>8}  {:10} {}",
        "column".bold(),
        "nulls".bold(),
        "uniques".bold(),
        "type".bold(),
        "values".bold()
    );
    for label in outcome.dataset.header.iter() {
        let null_ct = nulls.and_then(|r| r.count(label)).unwrap_or(0);
        let unique_ct = uniques.and_then(|r| r.count(label)).unwrap_or(0);
        let probable = types
            .and_then(|r| profile_field(r, label, "probable_type"))
            .and_then(Value::as_str)
            .unwrap_or("-");
        let sample = values
            .and_then(|r| profile_field(r, label, "unique_values"))
            .map(describe_values)
            .unwrap_or_default();

        let null_text = if null_ct > 0 {
            null_ct.to_string().yellow()
        } else {
            null_ct.to_string().normal()
        };
        let type_text = match probable {
            "numeric" => probable.blue(),
            "string" => probable.green(),
            _ => probable.magenta(),
        };
        println!(
            "  {:24} {:>8} {:>8}  {:10} {}",
            label, null_text, unique_ct, type_text, sample
        );
    }

    Ok(())
}

/// A short preview of a column's unique values.
fn describe_values(values: &Value) -> String {
    match values {
        Value::String(s) if s == "primary_key" => "(all distinct)".dimmed().to_string(),
        Value::Array(items) => {
            let shown: Vec<&str> = items.iter().filter_map(Value::as_str).take(5).collect();
            let more = items.len().saturating_sub(shown.len());
            if more > 0 {
                format!("{} (+{} more)", shown.join(", "), more)
            } else {
                shown.join(", ")
            }
        }
        _ => String::new(),
    }
}
