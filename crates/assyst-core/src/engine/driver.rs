//! The perturbation driver.
//!
//! Every input structure is offered to every perturbation. Each pair gets a fixed
//! number of attempts to produce a candidate that passes all filters; the first one
//! that does is yielded. A validation error from the perturbation ends the pair
//! immediately, since retrying the same input cannot succeed.

use crate::core::filters::Evaluate;
use crate::core::lineage::assign_new_identity;
use crate::core::models::structure::Structure;
use crate::core::perturbations::Perturb;
use tracing::{debug, trace};

pub use super::config::DEFAULT_RETRIES;

/// Lazily perturbs `structures` with each of `perturbations`.
///
/// Output order is input order, then perturbation order. Every attempt works on a
/// fresh copy of the input, so inputs are never modified. Perturbations that do not
/// manage identities themselves (plain functions) get a new identity assigned to each
/// of their outputs here.
pub fn apply_perturbations<'a, I, P, F>(
    structures: I,
    perturbations: &'a mut [P],
    filters: &'a [F],
    retries: usize,
) -> Perturbed<'a, I::IntoIter, P, F>
where
    I: IntoIterator<Item = Structure>,
    P: Perturb,
    F: Evaluate,
{
    Perturbed {
        structures: structures.into_iter(),
        perturbations,
        filters,
        retries,
        current: None,
        next_perturbation: 0,
    }
}

pub struct Perturbed<'a, I, P, F> {
    structures: I,
    perturbations: &'a mut [P],
    filters: &'a [F],
    retries: usize,
    current: Option<Structure>,
    next_perturbation: usize,
}

impl<I, P, F> Iterator for Perturbed<'_, I, P, F>
where
    I: Iterator<Item = Structure>,
    P: Perturb,
    F: Evaluate,
{
    type Item = Structure;

    fn next(&mut self) -> Option<Structure> {
        loop {
            if self.current.is_none() || self.next_perturbation >= self.perturbations.len() {
                self.current = Some(self.structures.next()?);
                self.next_perturbation = 0;
                continue;
            }
            let index = self.next_perturbation;
            self.next_perturbation += 1;

            let Some(structure) = self.current.as_ref() else {
                continue;
            };
            let perturbation = &mut self.perturbations[index];
            if let Some(result) = attempt(structure, perturbation, self.filters, self.retries) {
                return Some(result);
            }
        }
    }
}

fn attempt<P: Perturb, F: Evaluate>(
    structure: &Structure,
    perturbation: &mut P,
    filters: &[F],
    retries: usize,
) -> Option<Structure> {
    for attempt in 1..=retries {
        let mut candidate = match perturbation.perturb(structure.clone()) {
            Ok(candidate) => candidate,
            Err(e) => {
                debug!(
                    uuid = structure.info().uuid.as_deref(),
                    error = %e,
                    "Perturbation not applicable, skipping."
                );
                return None;
            }
        };
        // an empty series, say, hands the parent back unchanged
        if !perturbation.assigns_identity() || candidate.info().uuid == structure.info().uuid {
            assign_new_identity(&mut candidate);
        }
        if filters.iter().all(|f| f.evaluate(&candidate)) {
            trace!(attempt, "Perturbed structure accepted.");
            return Some(candidate);
        }
        trace!(attempt, "Perturbed structure rejected by filters.");
    }
    debug!(
        uuid = structure.info().uuid.as_deref(),
        retries, "No perturbed structure passed the filters."
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filters::{Filter, VolumeFilter};
    use crate::core::perturbations::{Perturbation, PerturbationError, Rattle, Series, Stretch};
    use nalgebra::{Matrix3, Point3};
    use std::cell::Cell;

    fn cubic(label: &str) -> Structure {
        let mut s = Structure::periodic(
            ["Cu", "Cu"],
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.5, 1.5, 1.5)],
            Matrix3::from_diagonal_element(3.0),
        )
        .unwrap();
        s.info_mut().uuid = Some(label.to_string());
        s
    }

    fn shift(mut s: Structure) -> Result<Structure, PerturbationError> {
        s.positions_mut()[0].x += 0.01;
        Ok(s)
    }

    #[test]
    fn yields_after_filter_fails_k_times() {
        let retries = 10;
        for k in 0..retries {
            let evaluations = Cell::new(0);
            let filter = |_: &Structure| {
                evaluations.set(evaluations.get() + 1);
                evaluations.get() > k
            };
            let mut perturbations = [shift];
            let out: Vec<_> =
                apply_perturbations([cubic("a")], &mut perturbations, &[filter], retries).collect();
            assert_eq!(out.len(), 1);
            assert_eq!(evaluations.get(), k + 1);
        }
    }

    #[test]
    fn always_failing_filter_uses_exactly_the_retry_budget() {
        let evaluations = Cell::new(0);
        let filter = |_: &Structure| {
            evaluations.set(evaluations.get() + 1);
            false
        };
        let mut perturbations = [shift];
        let out: Vec<_> =
            apply_perturbations([cubic("a")], &mut perturbations, &[filter], 7).collect();
        assert!(out.is_empty());
        assert_eq!(evaluations.get(), 7);
    }

    #[test]
    fn validation_error_abandons_the_pair() {
        let calls = Cell::new(0);
        let failing = |_: Structure| -> Result<Structure, PerturbationError> {
            calls.set(calls.get() + 1);
            Err(PerturbationError::SingleAtom)
        };
        let mut perturbations = [failing];
        let filters: [fn(&Structure) -> bool; 0] = [];
        let out: Vec<_> =
            apply_perturbations([cubic("a")], &mut perturbations, &filters, 10).collect();
        assert!(out.is_empty());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn error_after_rejections_stops_retrying() {
        let calls = Cell::new(0);
        let flaky = |s: Structure| {
            calls.set(calls.get() + 1);
            if calls.get() == 1 {
                Ok(s)
            } else {
                Err(PerturbationError::MissingCell)
            }
        };
        let mut perturbations = [flaky];
        let reject_all = [|_: &Structure| false];
        let out: Vec<_> =
            apply_perturbations([cubic("a")], &mut perturbations, &reject_all, 10).collect();
        assert!(out.is_empty());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn output_order_is_structure_then_perturbation() {
        let mut perturbations: Vec<Perturbation> = vec![
            Rattle::new(0.05).with_seed(1).into(),
            Stretch::new(0.05, 0.05).with_seed(2).into(),
        ];
        let filters: [Filter; 0] = [];
        let out: Vec<_> = apply_perturbations(
            [cubic("a"), cubic("b")],
            &mut perturbations,
            &filters,
            DEFAULT_RETRIES,
        )
        .collect();

        let summary: Vec<(String, String)> = out
            .iter()
            .map(|s| {
                (
                    s.info().lineage()[0].clone(),
                    s.info().perturbation.clone().unwrap(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("a".to_string(), "rattle(0.05)".to_string()),
                ("a".to_string(), "stretch(hydro=0.05, shear=0.05)".to_string()),
                ("b".to_string(), "rattle(0.05)".to_string()),
                ("b".to_string(), "stretch(hydro=0.05, shear=0.05)".to_string()),
            ]
        );
    }

    #[test]
    fn plain_functions_get_identity_from_the_driver() {
        let mut perturbations = [shift];
        let filters: [Filter; 0] = [];
        let out: Vec<_> =
            apply_perturbations([cubic("a")], &mut perturbations, &filters, 1).collect();
        assert_eq!(out[0].info().lineage(), ["a".to_string()]);
        assert!(out[0].info().perturbation.is_none());
    }

    #[test]
    fn perturbation_objects_are_not_reidentified_by_the_driver() {
        let mut perturbations = [Perturbation::from(Rattle::new(0.05).with_seed(3))];
        let filters: [Filter; 0] = [];
        let out: Vec<_> =
            apply_perturbations([cubic("a")], &mut perturbations, &filters, 1).collect();
        // one identity change from the rattle, none from the driver
        assert_eq!(out[0].info().lineage(), ["a".to_string()]);
    }

    #[test]
    fn pass_through_perturbations_still_yield_a_new_identity() {
        let mut perturbations = [Perturbation::from(Series::default())];
        let filters: [Filter; 0] = [];
        let out: Vec<_> =
            apply_perturbations([cubic("a")], &mut perturbations, &filters, 1).collect();
        assert_eq!(out.len(), 1);
        assert_ne!(out[0].info().uuid.as_deref(), Some("a"));
        assert_eq!(out[0].info().lineage(), ["a".to_string()]);
    }

    #[test]
    fn inputs_are_not_modified_between_attempts() {
        let seen = Cell::new(0);
        let input = cubic("a");
        let expected = input.positions()[0];
        let check = |s: Structure| {
            assert_eq!(s.positions()[0], expected);
            seen.set(seen.get() + 1);
            shift(s)
        };
        let mut perturbations = [check];
        let reject_all = [|_: &Structure| false];
        let _ = apply_perturbations([input], &mut perturbations, &reject_all, 5).count();
        assert_eq!(seen.get(), 5);
    }

    #[test]
    fn filters_prune_candidates() {
        let mut perturbations = [Perturbation::from(Stretch::new(0.05, 0.05).with_seed(0))];
        let filters = [Filter::from(VolumeFilter::new(1.0))];
        let count =
            apply_perturbations([cubic("a")], &mut perturbations, &filters, 3).count();
        assert_eq!(count, 0);
    }

    #[test]
    fn empty_inputs_or_perturbations_yield_nothing() {
        let filters: [Filter; 0] = [];
        let mut none: [Perturbation; 0] = [];
        assert_eq!(
            apply_perturbations([cubic("a"), cubic("b")], &mut none, &filters, 3).count(),
            0
        );
        let mut one = [Perturbation::from(Rattle::new(0.1))];
        assert_eq!(
            apply_perturbations(Vec::<Structure>::new(), &mut one, &filters, 3).count(),
            0
        );
    }
}
