//! datagenius CLI - staged cleaning for messy spreadsheet data.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging(verbose: bool) {
    let default = if verbose { "datagenius=debug" } else { "warn" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args, cli.verbose),
        Commands::Explore { file, config, json } => commands::explore::run(file, config, json),
        Commands::Names(args) => commands::names::run(args),
        Commands::Supplement(args) => commands::supplement::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
