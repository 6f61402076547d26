mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    std::panic::set_hook(Box::new(|info| {
        error!("{}", info);
    }));

    info!("🚀 ASSYST CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let command_result = match cli.command {
        Commands::Perturb(args) => {
            info!("Dispatching to 'perturb' command.");
            commands::perturb::run(args)
        }
        Commands::Filter(args) => {
            info!("Dispatching to 'filter' command.");
            commands::filter::run(args)
        }
        Commands::Formulas(args) => {
            info!("Dispatching to 'formulas' command.");
            commands::formulas::run(args)
        }
    };

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }
    command_result
}
