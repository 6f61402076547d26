use crate::core::filters::tolerance::ToleranceMatrix;
use crate::core::formulas::{self, Formulas, Stoichiometry};
use crate::core::lineage::assign_new_identity;
use crate::core::models::structure::Structure;
use crate::core::perturbations::RngHandle;
use crate::engine::config::{Dimensionality, SamplingConfig};
use crate::engine::error::SamplingError;
use crate::engine::external::{SampleRequest, StructureSampler};
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{debug, info, instrument};

/// Samples symmetric structures for every stoichiometry in `formulas`.
///
/// The request is validated eagerly; sampling itself happens lazily, one formula at a
/// time, as the returned iterator is consumed. Zero counts are dropped from each
/// stoichiometry, empty ones and those outside `[min_atoms, max_atoms]` are skipped, and
/// the total number of structures is capped at `max_structures`. Every sampled
/// structure receives a fresh identity.
#[instrument(skip_all, name = "sample_space_groups")]
pub fn sample_space_groups<'a, S: StructureSampler>(
    formulas: &'a Formulas,
    config: &SamplingConfig,
    sampler: &'a mut S,
    rng: &'a mut RngHandle,
    reporter: &'a ProgressReporter<'a>,
) -> Result<Sampled<'a, S>, SamplingError> {
    let spacegroups = resolve_spacegroups(config.spacegroups.as_deref(), config.dim)?;
    let elements: Vec<&str> = formulas.elements().into_iter().collect();
    let tolerance = config.tolerance.resolve(&elements);

    info!(
        formulas = formulas.len(),
        spacegroups = spacegroups.len(),
        dim = %config.dim,
        "Sampling symmetric structures."
    );
    reporter.report(Progress::TaskStart {
        total_steps: formulas.len() as u64,
    });

    Ok(Sampled {
        formulas: formulas.iter(),
        sampler,
        rng,
        reporter,
        spacegroups,
        dim: config.dim,
        tolerance,
        min_atoms: config.min_atoms,
        max_atoms: config.max_atoms,
        remaining: config.max_structures,
        pending: Vec::new().into_iter(),
        finished: false,
    })
}

fn resolve_spacegroups(
    requested: Option<&[u32]>,
    dim: Dimensionality,
) -> Result<Vec<u32>, SamplingError> {
    let max = dim.max_group();
    match requested {
        None => Ok((1..=max).collect()),
        Some([]) => Err(SamplingError::EmptySpaceGroups),
        Some(groups) => {
            if let Some(&group) = groups.iter().find(|&&g| g < 1 || g > max) {
                return Err(SamplingError::SpaceGroupOutOfRange {
                    group,
                    dim: dim.into(),
                    max,
                });
            }
            Ok(groups.to_vec())
        }
    }
}

pub struct Sampled<'a, S> {
    formulas: std::slice::Iter<'a, Stoichiometry>,
    sampler: &'a mut S,
    rng: &'a mut RngHandle,
    reporter: &'a ProgressReporter<'a>,
    spacegroups: Vec<u32>,
    dim: Dimensionality,
    tolerance: Option<ToleranceMatrix>,
    min_atoms: u32,
    max_atoms: u32,
    remaining: Option<usize>,
    pending: std::vec::IntoIter<Structure>,
    finished: bool,
}

impl<S: StructureSampler> Sampled<'_, S> {
    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            self.reporter.report(Progress::TaskFinish);
        }
    }

    /// Samples one formula, or returns `None` when it is skipped.
    fn sample(&mut self, stoichiometry: &Stoichiometry) -> Option<Vec<Structure>> {
        let present: Stoichiometry = stoichiometry
            .iter()
            .filter(|&(_, &count)| count > 0)
            .map(|(element, &count)| (element.clone(), count))
            .collect();
        if present.is_empty() {
            return None;
        }
        let total = formulas::total_atoms(&present);
        if total < self.min_atoms || total > self.max_atoms {
            debug!(total, "Skipping formula outside the atom count bounds.");
            return None;
        }

        let label = formulas::label(&present);
        self.reporter.report(Progress::StatusUpdate {
            text: label.clone(),
        });

        let request = SampleRequest {
            spacegroups: self.spacegroups.clone(),
            elements: present.keys().cloned().collect(),
            counts: present.values().copied().collect(),
            dim: self.dim,
            tolerance: self.tolerance.clone(),
            max_results: self.remaining,
        };
        let mut structures = self.sampler.sample(&request, self.rng);
        if let Some(remaining) = self.remaining {
            structures.truncate(remaining);
            self.remaining = Some(remaining - structures.len());
        }
        for structure in &mut structures {
            assign_new_identity(structure);
        }
        debug!(formula = %label, sampled = structures.len(), "Sampled formula.");
        Some(structures)
    }
}

impl<S: StructureSampler> Iterator for Sampled<'_, S> {
    type Item = Structure;

    fn next(&mut self) -> Option<Structure> {
        loop {
            if let Some(structure) = self.pending.next() {
                return Some(structure);
            }
            if self.finished || self.remaining == Some(0) {
                self.finish();
                return None;
            }
            let Some(stoichiometry) = self.formulas.next() else {
                self.finish();
                return None;
            };
            if let Some(structures) = self.sample(stoichiometry) {
                self.pending = structures.into_iter();
            }
            self.reporter.report(Progress::TaskIncrement);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filters::tolerance::{Tolerance, TolerancePreset};
    use crate::engine::config::SamplingConfigBuilder;
    use crate::engine::progress::tests::recording;
    use nalgebra::{Matrix3, Point3};
    use std::collections::BTreeMap;

    /// Places all atoms on a line in a cubic cell; one structure per requested group.
    #[derive(Default)]
    struct LineSampler {
        requests: Vec<SampleRequest>,
    }

    impl StructureSampler for LineSampler {
        fn sample(&mut self, request: &SampleRequest, rng: &mut RngHandle) -> Vec<Structure> {
            self.requests.push(request.clone());
            let symbols: Vec<String> = request
                .elements
                .iter()
                .zip(&request.counts)
                .flat_map(|(e, &n)| std::iter::repeat_n(e.clone(), n as usize))
                .collect();
            let n = symbols.len();
            request
                .spacegroups
                .iter()
                .map(|&group| {
                    let offset = rng.uniform();
                    let positions = (0..n)
                        .map(|i| Point3::new(i as f64 * 2.0 + offset, 0.0, 0.0))
                        .collect();
                    let mut s = Structure::periodic(
                        symbols.clone(),
                        positions,
                        Matrix3::from_diagonal_element(2.0 * n as f64 + 2.0),
                    )
                    .unwrap();
                    s.info_mut().insert("spacegroup", group);
                    s
                })
                .collect()
        }
    }

    fn stoich(pairs: &[(&str, u32)]) -> Stoichiometry {
        pairs.iter().map(|(e, n)| (e.to_string(), *n)).collect()
    }

    #[test]
    fn rejects_space_groups_outside_the_dimensionality() {
        let formulas = Formulas::up_to("Cu", 3);
        let reporter = ProgressReporter::new();
        let mut sampler = LineSampler::default();
        let mut rng = RngHandle::from_seed(0);

        let config = SamplingConfigBuilder::new()
            .dim(Dimensionality::Two)
            .spacegroups(vec![1, 81])
            .build()
            .unwrap();
        let err = sample_space_groups(&formulas, &config, &mut sampler, &mut rng, &reporter)
            .err()
            .unwrap();
        assert_eq!(
            err,
            SamplingError::SpaceGroupOutOfRange {
                group: 81,
                dim: 2,
                max: 80
            }
        );

        let config = SamplingConfigBuilder::new()
            .spacegroups(vec![0])
            .build()
            .unwrap();
        assert!(
            sample_space_groups(&formulas, &config, &mut sampler, &mut rng, &reporter).is_err()
        );

        let config = SamplingConfigBuilder::new()
            .spacegroups(vec![])
            .build()
            .unwrap();
        assert_eq!(
            sample_space_groups(&formulas, &config, &mut sampler, &mut rng, &reporter)
                .err()
                .unwrap(),
            SamplingError::EmptySpaceGroups
        );
        assert!(sampler.requests.is_empty());
    }

    #[test]
    fn defaults_to_every_group_of_the_dimensionality() {
        assert_eq!(resolve_spacegroups(None, Dimensionality::Zero).unwrap().len(), 58);
        assert_eq!(resolve_spacegroups(None, Dimensionality::Three).unwrap().len(), 230);
        assert_eq!(
            resolve_spacegroups(Some(&[225, 229][..]), Dimensionality::Three).unwrap(),
            vec![225, 229]
        );
    }

    #[test]
    fn drops_zero_counts_and_skips_out_of_bounds_formulas() {
        let formulas = Formulas::new(vec![
            stoich(&[("Cu", 0), ("Ag", 0)]),
            stoich(&[("Cu", 2), ("Ag", 0)]),
            stoich(&[("Cu", 6), ("Ag", 6)]),
            stoich(&[("Cu", 1), ("Ag", 1)]),
        ]);
        let config = SamplingConfigBuilder::new()
            .spacegroups(vec![1])
            .max_atoms(4)
            .build()
            .unwrap();
        let (reporter, events) = recording();
        let mut sampler = LineSampler::default();
        let mut rng = RngHandle::from_seed(0);

        let out: Vec<Structure> =
            sample_space_groups(&formulas, &config, &mut sampler, &mut rng, &reporter)
                .unwrap()
                .collect();

        assert_eq!(out.len(), 2);
        assert_eq!(sampler.requests.len(), 2);
        assert_eq!(sampler.requests[0].elements, vec!["Cu".to_string()]);
        assert_eq!(sampler.requests[0].counts, vec![2]);
        assert_eq!(sampler.requests[1].counts, vec![1, 1]);

        let events = events.lock().unwrap();
        let labels: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                Progress::StatusUpdate { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["Cu2", "Cu1Ag1"]);
        assert_eq!(events.first(), Some(&Progress::TaskStart { total_steps: 4 }));
        assert_eq!(
            events
                .iter()
                .filter(|e| **e == Progress::TaskIncrement)
                .count(),
            4
        );
        assert_eq!(events.last(), Some(&Progress::TaskFinish));
    }

    #[test]
    fn global_budget_truncates_and_stops_sampling() {
        let formulas = Formulas::up_to("Cu", 6);
        let config = SamplingConfigBuilder::new()
            .spacegroups(vec![1, 2, 3])
            .max_structures(4)
            .build()
            .unwrap();
        let reporter = ProgressReporter::new();
        let mut sampler = LineSampler::default();
        let mut rng = RngHandle::from_seed(0);

        let out: Vec<Structure> =
            sample_space_groups(&formulas, &config, &mut sampler, &mut rng, &reporter)
                .unwrap()
                .collect();

        assert_eq!(out.len(), 4);
        assert_eq!(sampler.requests.len(), 2);
        assert_eq!(sampler.requests[0].max_results, Some(4));
        assert_eq!(sampler.requests[1].max_results, Some(1));
    }

    #[test]
    fn sampled_structures_get_fresh_identities() {
        let formulas = Formulas::up_to("Cu", 2);
        let config = SamplingConfigBuilder::new()
            .spacegroups(vec![1, 2])
            .build()
            .unwrap();
        let reporter = ProgressReporter::new();
        let mut sampler = LineSampler::default();
        let mut rng = RngHandle::from_seed(0);

        let out: Vec<Structure> =
            sample_space_groups(&formulas, &config, &mut sampler, &mut rng, &reporter)
                .unwrap()
                .collect();
        assert_eq!(out.len(), 2);
        for s in &out {
            assert!(s.info().uuid.is_some());
            assert_eq!(s.info().seed, s.info().uuid);
            assert!(s.info().lineage.is_none());
        }
        assert_ne!(out[0].info().uuid, out[1].info().uuid);
        assert_eq!(out[1].info().get("spacegroup"), Some(&serde_json::json!(2)));
    }

    #[test]
    fn tolerance_is_resolved_over_all_elements() {
        let formulas = Formulas::up_to("Cu", 2)
            .outer_product(&Formulas::up_to("Ag", 2))
            .unwrap();
        let reporter = ProgressReporter::new();
        let mut rng = RngHandle::from_seed(0);

        let mut sampler = LineSampler::default();
        let config = SamplingConfigBuilder::new()
            .spacegroups(vec![1])
            .tolerance(TolerancePreset::Atomic)
            .build()
            .unwrap();
        let _ = sample_space_groups(&formulas, &config, &mut sampler, &mut rng, &reporter)
            .unwrap()
            .count();
        let tolerance = sampler.requests[0].tolerance.clone().unwrap();
        assert!((tolerance.get("Cu", "Cu").unwrap() - 1.32).abs() < 1e-12);
        assert!(tolerance.get("Ag", "Cu").is_some());

        let mut sampler = LineSampler::default();
        let config = SamplingConfigBuilder::new()
            .spacegroups(vec![1])
            .tolerance(Tolerance::Radii(BTreeMap::new()))
            .build()
            .unwrap();
        let _ = sample_space_groups(&formulas, &config, &mut sampler, &mut rng, &reporter)
            .unwrap()
            .count();
        assert!(sampler.requests[0].tolerance.is_none());
    }

    #[test]
    fn sampling_is_lazy() {
        let formulas = Formulas::up_to("Cu", 4);
        let config = SamplingConfigBuilder::new()
            .spacegroups(vec![1])
            .build()
            .unwrap();
        let reporter = ProgressReporter::new();
        let mut sampler = LineSampler::default();
        let mut rng = RngHandle::from_seed(0);

        let mut stream =
            sample_space_groups(&formulas, &config, &mut sampler, &mut rng, &reporter).unwrap();
        assert!(stream.next().is_some());
        drop(stream);
        assert_eq!(sampler.requests.len(), 1);
    }
}
