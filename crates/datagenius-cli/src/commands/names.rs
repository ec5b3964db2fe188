//! Names command - split a column of full names into components.

use colored::Colorize;

use datagenius::plan::NamesPlan;
use datagenius::{write_dataset, Genius, OutputFormat};

use super::{load_config, preprocess_plan, print_saved, read_dataset, sibling_path, CommandResult};
use crate::cli::NamesArgs;

pub fn run(args: NamesArgs) -> CommandResult {
    let config = load_config(args.config.as_deref())?;

    let mut plan = preprocess_plan();
    plan.clean.names.push(NamesPlan {
        column: Some(args.column.clone()),
        tokens: None,
        name_num: args.name_num,
        include_name2: args.include_name2,
    });
    let genius = Genius::with_config(config.clone()).with_plan(&plan)?;

    let (dataset, _) = read_dataset(&args.file, &config)?;
    println!(
        "{} {} in {}",
        "Parsing names".cyan().bold(),
        args.column.white(),
        args.file.display().to_string().white()
    );
    let outcome = genius.go(dataset)?;

    if let Some(report) = outcome.metadata.report("parse_names") {
        println!(
            "Parsed {} names ({} valid, {} invalid)",
            report.count("parsed").unwrap_or(0).to_string().white().bold(),
            report.count("valid").unwrap_or(0).to_string().green(),
            report.count("invalid").unwrap_or(0).to_string().red()
        );
        let second = report.count("second_names").unwrap_or(0);
        if second > 0 {
            println!("{} rows name a second person", second.to_string().white().bold());
        }
    }

    let output = args
        .output
        .unwrap_or_else(|| sibling_path(&args.file, "names", "csv"));
    write_dataset(&outcome.dataset, &output, OutputFormat::from_path(&output))?;
    print_saved(&output);
    Ok(())
}
