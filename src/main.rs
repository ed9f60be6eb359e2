use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use studysync::cli::args::{Cli, Commands};
use studysync::cli::commands::{self, Context};
use studysync::config::{Config, Paths};
use studysync::error::StudySyncError;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "STUDYSYNC_LOG";

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        let code = e
            .downcast_ref::<StudySyncError>()
            .map_or(1, StudySyncError::exit_code);
        std::process::exit(code);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = Paths::new()?;
    let config = Config::load_from_path(&paths.config_file)?;
    config.general.color.apply();
    let format = cli.output.unwrap_or(config.general.default_output);

    let ctx = Context::open(paths, config)?;

    let output = match cli.command {
        Commands::Queue(args) => commands::queue(&ctx, args.command, format)?,
        Commands::Network(args) => commands::network(&ctx, args.command, format)?,
        Commands::Progress(args) => commands::progress(&ctx, args.command, format)?,
        Commands::Session(args) => commands::session(&ctx, args, format)?,
    };

    if !output.is_empty() {
        println!("{}", output.trim_end());
    }
    Ok(())
}
