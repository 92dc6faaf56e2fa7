mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod plot;
mod utils;

use crate::cli::{Cli, Commands};
use crate::config::FileConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if run_app().is_err() {
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    let result = logging::setup_logging(cli.verbose, cli.quiet, Some(cli.command.logfile()))
        .and_then(|()| dispatch(cli));

    match &result {
        Ok(_) => {
            info!("Command completed successfully.");
            println!("Command completed successfully.");
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("Command failed: {}", e);
        }
    }
    result
}

fn dispatch(cli: Cli) -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!(
        "mdsetup v{} running '{}'.",
        env!("CARGO_PKG_VERSION"),
        cli.command.name()
    );
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let file_config = FileConfig::load(cli.config.as_deref())?;
    let progress = if cli.quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };

    match cli.command {
        Commands::Setup(args) => {
            info!("Dispatching to 'setup' command.");
            commands::setup::run(args)
        }
        Commands::Simfiles(args) => {
            info!("Dispatching to 'simfiles' command.");
            commands::simfiles::run(args, &file_config)
        }
        Commands::Solvate(args) => {
            info!("Dispatching to 'solvate' command.");
            commands::solvate::run(args, &file_config)
        }
        Commands::Rmsf(args) => {
            info!("Dispatching to 'rmsf' command.");
            commands::rmsf::run(args, &file_config, &progress)
        }
        Commands::Rmsf10(args) => {
            info!("Dispatching to 'rmsf10' command.");
            commands::rmsf10::run(args, &file_config, &progress)
        }
        Commands::Rms2d(args) => {
            info!("Dispatching to 'rms2d' command.");
            commands::rms2d::run(args, &file_config, &progress)
        }
    }
}
