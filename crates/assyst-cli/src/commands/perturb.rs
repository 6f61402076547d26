use crate::cli::PerturbArgs;
use crate::commands::{read_structures, write_json};
use crate::config::PartialPipelineConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use assyst::core::io::checkpoint;
use assyst::core::perturbations::Perturbation;
use assyst::engine::progress::ProgressReporter;
use assyst::workflows;
use tracing::{info, warn};

pub fn run(args: PerturbArgs) -> Result<()> {
    let partial_config = PartialPipelineConfig::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let mut config =
        partial_config.into_perturbation_config(args.retries, args.seed, &args.set_values)?;

    if let Some(state) = args.state.as_deref().filter(|p| p.exists()) {
        info!("Resuming perturbation state from {:?}", state);
        let resumed: Vec<Perturbation> =
            checkpoint::load(state).map_err(|e| CliError::FileParsing {
                path: state.to_path_buf(),
                source: e.into(),
            })?;
        if resumed.len() != config.perturbations.len() {
            return Err(CliError::Config(format!(
                "State file holds {} perturbations but the configuration defines {}.",
                resumed.len(),
                config.perturbations.len()
            )));
        }
        config.perturbations = resumed;
    }

    let structures = read_structures(&args.input)?;
    info!("Loaded {} structures from {:?}", structures.len(), &args.input);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Perturbing {} structures...", structures.len());
    let result = workflows::perturb::run(structures, &mut config, &reporter)?;

    if result.structures.is_empty() {
        warn!("No perturbed structure passed the filters.");
        println!("Warning: no perturbed structure passed the filters.");
    }
    write_json(&result.structures, &args.output)?;
    println!(
        "✓ {} structures written to: {}",
        result.structures.len(),
        args.output.display()
    );

    if let Some(state) = &args.state {
        write_json(&config.perturbations, state)?;
        info!("Perturbation state saved to {:?}", state);
    }

    Ok(())
}
