use crate::cli::FilterArgs;
use crate::commands::{read_structures, write_json};
use crate::config::PartialPipelineConfig;
use crate::error::Result;
use assyst::workflows::perturb::retain_passing;
use tracing::info;

pub fn run(args: FilterArgs) -> Result<()> {
    let filters = PartialPipelineConfig::from_file(&args.config)?.into_filters()?;
    let structures = read_structures(&args.input)?;
    let total = structures.len();

    let kept = retain_passing(structures, &filters);
    info!(
        total,
        kept = kept.len(),
        filters = filters.len(),
        "Filtered structures."
    );

    write_json(&kept, &args.output)?;
    println!(
        "✓ {} of {} structures written to: {}",
        kept.len(),
        total,
        args.output.display()
    );
    Ok(())
}
