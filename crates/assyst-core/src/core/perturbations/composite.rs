use super::functions::PerturbationError;
use super::rng::RngHandle;
use super::{Perturb, Perturbation};
use crate::core::models::structure::Structure;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Applies its members one after the other.
///
/// The series itself neither tags nor re-identifies the structure; each member does.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub perturbations: Vec<Perturbation>,
}

impl Series {
    pub fn new(perturbations: Vec<Perturbation>) -> Self {
        Self { perturbations }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.perturbations.iter().join("+"))
    }
}

impl Perturb for Series {
    fn perturb(&mut self, structure: Structure) -> Result<Structure, PerturbationError> {
        self.perturbations
            .iter_mut()
            .try_fold(structure, |structure, p| p.perturb(structure))
    }
}

/// Applies exactly one of two perturbations.
///
/// One uniform number `u` is drawn per call; `u > chance` selects `choice_a`, anything
/// else `choice_b`. `chance` is therefore the probability of picking `choice_b`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomChoice {
    pub choice_a: Box<Perturbation>,
    pub choice_b: Box<Perturbation>,
    pub chance: f64,
    #[serde(default)]
    pub rng: RngHandle,
}

impl RandomChoice {
    pub fn new(
        choice_a: impl Into<Perturbation>,
        choice_b: impl Into<Perturbation>,
        chance: f64,
    ) -> Self {
        Self {
            choice_a: Box::new(choice_a.into()),
            choice_b: Box::new(choice_b.into()),
            chance,
            rng: RngHandle::from_entropy(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = RngHandle::from_seed(seed);
        self
    }
}

impl PartialEq for RandomChoice {
    fn eq(&self, other: &Self) -> bool {
        self.choice_a == other.choice_a
            && self.choice_b == other.choice_b
            && self.chance == other.chance
    }
}

impl fmt::Display for RandomChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.choice_a, self.choice_b)
    }
}

impl Perturb for RandomChoice {
    fn perturb(&mut self, structure: Structure) -> Result<Structure, PerturbationError> {
        if self.rng.uniform() > self.chance {
            self.choice_a.perturb(structure)
        } else {
            self.choice_b.perturb(structure)
        }
    }
}
