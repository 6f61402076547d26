use crate::core::filters::{Evaluate, Filter};
use crate::core::models::structure::Structure;
use crate::engine::config::{ConfigError, PerturbationConfig};
use crate::engine::driver::apply_perturbations;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct PerturbationResult {
    /// Accepted perturbed structures, in input then perturbation order.
    pub structures: Vec<Structure>,
    pub inputs: usize,
    pub rejected_by_prefilter: usize,
}

/// Runs every configured perturbation over `structures`.
///
/// Inputs failing any prefilter are dropped first. Perturbations advance their random
/// state in place, so calling this again with the same `config` continues the
/// sequence rather than repeating it.
#[instrument(skip_all, name = "perturbation_workflow")]
pub fn run(
    structures: Vec<Structure>,
    config: &mut PerturbationConfig,
    reporter: &ProgressReporter,
) -> Result<PerturbationResult, EngineError> {
    if config.perturbations.is_empty() {
        return Err(ConfigError::MissingParameter("perturbations").into());
    }
    let inputs = structures.len();
    info!(
        inputs,
        perturbations = config.perturbations.len(),
        filters = config.filters.len(),
        retries = config.retries,
        "Starting perturbation workflow."
    );

    let accepted = reporter.phase("Prefiltering", || {
        reporter.report(Progress::TaskStart {
            total_steps: inputs as u64,
        });
        let accepted: Vec<Structure> = structures
            .into_iter()
            .filter(|s| {
                let pass = passes(s, &config.prefilters);
                reporter.report(Progress::TaskIncrement);
                pass
            })
            .collect();
        reporter.report(Progress::TaskFinish);
        accepted
    });
    let rejected_by_prefilter = inputs - accepted.len();
    if rejected_by_prefilter > 0 {
        info!(rejected = rejected_by_prefilter, "Inputs removed by prefilters.");
    }

    let perturbed = reporter.phase("Perturbing", || {
        reporter.report(Progress::TaskStart {
            total_steps: accepted.len() as u64,
        });
        let mut perturbed = Vec::new();
        for structure in accepted {
            perturbed.extend(apply_perturbations(
                std::iter::once(structure),
                &mut config.perturbations,
                &config.filters,
                config.retries,
            ));
            reporter.report(Progress::TaskIncrement);
        }
        reporter.report(Progress::TaskFinish);
        perturbed
    });

    info!(
        generated = perturbed.len(),
        "Perturbation workflow complete."
    );
    reporter.report(Progress::Message(format!(
        "Generated {} structures from {} inputs.",
        perturbed.len(),
        inputs - rejected_by_prefilter
    )));

    Ok(PerturbationResult {
        structures: perturbed,
        inputs,
        rejected_by_prefilter,
    })
}

/// Keeps the structures that pass every filter.
pub fn retain_passing(structures: Vec<Structure>, filters: &[Filter]) -> Vec<Structure> {
    structures
        .into_iter()
        .filter(|s| passes(s, filters))
        .collect()
}

fn passes(structure: &Structure, filters: &[Filter]) -> bool {
    filters.iter().all(|f| f.evaluate(structure))
}
