//! Run command - clean a data file with the default pipeline or a plan.

use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use datagenius::input::{write_delimited, write_json};
use datagenius::{write_dataset, Genius, GeniusMetadata, PipelinePlan, SourceMetadata, Stage};

use super::{load_config, print_saved, read_dataset, sibling_path, CommandResult};
use crate::cli::RunArgs;

/// What `--metadata` writes.
#[derive(Serialize)]
struct RunMetadata<'a> {
    source: &'a SourceMetadata,
    header_idx: Option<usize>,
    rows: usize,
    columns: Vec<&'a str>,
    #[serde(flatten)]
    metadata: &'a GeniusMetadata,
}

pub fn run(args: RunArgs, verbose: bool) -> CommandResult {
    let config = load_config(args.config.as_deref())?;
    let mut genius = Genius::with_config(config.clone());
    if let Some(plan_path) = &args.plan {
        let plan = PipelinePlan::from_yaml_file(plan_path)?;
        debug!(plan = %plan_path.display(), "loaded pipeline plan");
        genius = genius.with_plan(&plan)?;
    }

    let (dataset, source) = read_dataset(&args.file, &config)?;
    println!(
        "{} {} ({} records, {} columns)",
        "Cleaning".cyan().bold(),
        args.file.display().to_string().white(),
        source.row_count,
        source.column_count
    );

    if verbose {
        println!("Pipeline: {}", genius.transmutation_names().join(" → "));
    }

    let outcome = genius.go(dataset)?;
    print_summary(&outcome.metadata, verbose);

    println!();
    if let Some(idx) = outcome.header_idx {
        println!("Header found at row {}", idx.to_string().white().bold());
    }
    println!(
        "Kept {} rows, rejected {}",
        outcome.dataset.row_count().to_string().green().bold(),
        outcome.metadata.total_rejected().to_string().red()
    );

    let output = args
        .output
        .unwrap_or_else(|| sibling_path(&args.file, "clean", args.format.extension()));
    write_dataset(&outcome.dataset, &output, args.format.into())?;
    print_saved(&output);

    if let Some(path) = &args.metadata {
        let meta = RunMetadata {
            source: &source,
            header_idx: outcome.header_idx,
            rows: outcome.dataset.row_count(),
            columns: outcome.dataset.header.iter().collect(),
            metadata: &outcome.metadata,
        };
        write_json(&meta, path)?;
        print_saved(path);
    }

    if let Some(path) = &args.rejects {
        match outcome.metadata.rejects() {
            Some(rejects) => {
                write_delimited(&rejects, path, b',')?;
                print_saved(path);
            }
            None => println!("{}", "No rows rejected".green()),
        }
    }

    Ok(())
}

fn print_summary(metadata: &GeniusMetadata, verbose: bool) {
    for stage in Stage::ALL {
        let mut reports = metadata.stage_reports(stage).peekable();
        if reports.peek().is_none() {
            continue;
        }
        println!();
        println!("{}", stage.to_string().to_uppercase().yellow().bold());
        for report in reports {
            let rejected = if report.rejected_rows > 0 {
                format!("{} rejected", report.rejected_rows).red().to_string()
            } else {
                String::new()
            };
            println!("  {:28} {}", report.transmutation, rejected);
            if verbose {
                for (key, value) in &report.metadata {
                    if value.is_number() {
                        println!("      {:24} {}", key, value);
                    }
                }
            }
        }
    }
}
