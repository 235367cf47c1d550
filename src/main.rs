use anyhow::Result;
use clap::Parser;
use dirsync::config::{Cli, Commands};
use dirsync::ui::style;
use dirsync::{commands, AnalyseConfig, Config, DirsyncError};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Sync(args) => {
            // Convert CLI args to Config - this validates the roots before any I/O
            let config = Config::try_from(args)?;
            commands::sync::run(&config)?;
        }
        Commands::Analyse(args) => {
            let config = AnalyseConfig::try_from(args)?;
            commands::analyse::run(&config)?;
        }
    }
    Ok(())
}

fn report_error(e: &anyhow::Error) {
    match e.downcast_ref::<DirsyncError>() {
        Some(DirsyncError::Precondition(problems)) => {
            for problem in problems {
                eprintln!("{}", style::error(problem));
            }
        }
        _ => eprintln!("{}", style::error(&format!("Error: {:#}", e))),
    }
}
