//! Supplement command - join other files onto a base file.

use colored::Colorize;

use datagenius::{supplement, write_dataset, OutputFormat, SupplementGuide};

use super::{load_config, print_saved, read_preprocessed, sibling_path, CommandResult};
use crate::cli::SupplementArgs;

pub fn run(args: SupplementArgs) -> CommandResult {
    let config = load_config(None)?;

    let base = read_preprocessed(&args.base, &config)?;
    let others = args
        .others
        .iter()
        .map(|p| read_preprocessed(p, &config))
        .collect::<Result<Vec<_>, _>>()?;

    let mut guide = if args.threshold.is_empty() {
        SupplementGuide::new(args.on.clone())
    } else {
        SupplementGuide::inexact(args.on.clone()).with_thresholds(args.threshold.clone())?
    };
    if !args.block.is_empty() {
        guide = guide.with_block(args.block.clone());
    }
    let suffixes = if args.suffix.is_empty() {
        None
    } else {
        Some(args.suffix.clone())
    };

    println!(
        "{} {} with {} file(s) on {}",
        "Supplementing".cyan().bold(),
        args.base.display().to_string().white(),
        others.len(),
        args.on.join(", ").white()
    );
    let joined = supplement(&base, &others, &[guide], suffixes)?;
    println!(
        "Result: {} rows, {} columns",
        joined.row_count().to_string().white().bold(),
        joined.column_count().to_string().white().bold()
    );

    let output = args
        .output
        .unwrap_or_else(|| sibling_path(&args.base, "supplemented", "csv"));
    write_dataset(&joined, &output, OutputFormat::from_path(&output))?;
    print_saved(&output);
    Ok(())
}
