use super::functions::{self, PerturbationError};
use super::rng::RngHandle;
use super::{Param, Perturb, prepare};
use crate::core::models::structure::Structure;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Displaces every atom by normal noise of width `sigma` (Å).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rattle {
    pub sigma: f64,
    /// Repeat single-atom cells 2×2×2 before rattling instead of failing.
    #[serde(default)]
    pub create_supercells: bool,
    #[serde(default)]
    pub rng: RngHandle,
}

impl Rattle {
    pub fn new(sigma: f64) -> Self {
        Self {
            sigma,
            create_supercells: false,
            rng: RngHandle::from_entropy(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = RngHandle::from_seed(seed);
        self
    }

    pub fn create_supercells(mut self, create_supercells: bool) -> Self {
        self.create_supercells = create_supercells;
        self
    }
}

impl PartialEq for Rattle {
    fn eq(&self, other: &Self) -> bool {
        self.sigma == other.sigma && self.create_supercells == other.create_supercells
    }
}

impl fmt::Display for Rattle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rattle({})", Param(self.sigma))
    }
}

impl Perturb for Rattle {
    fn perturb(&mut self, structure: Structure) -> Result<Structure, PerturbationError> {
        let mut structure = prepare(structure, &self.to_string(), self.create_supercells)?;
        functions::rattle(&mut structure, self.sigma, &mut self.rng)?;
        Ok(structure)
    }
}

/// Rattle whose width scales with a per-element reference length, e.g. the nearest
/// neighbour distance of the pure element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementScaledRattle {
    pub sigma: f64,
    pub reference: BTreeMap<String, f64>,
    #[serde(default)]
    pub create_supercells: bool,
    #[serde(default)]
    pub rng: RngHandle,
}

impl ElementScaledRattle {
    /// Fails when any reference length is not positive.
    pub fn new(sigma: f64, reference: BTreeMap<String, f64>) -> Result<Self, PerturbationError> {
        functions::check_reference(&reference)?;
        Ok(Self {
            sigma,
            reference,
            create_supercells: false,
            rng: RngHandle::from_entropy(),
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = RngHandle::from_seed(seed);
        self
    }

    pub fn create_supercells(mut self, create_supercells: bool) -> Self {
        self.create_supercells = create_supercells;
        self
    }
}

impl PartialEq for ElementScaledRattle {
    fn eq(&self, other: &Self) -> bool {
        self.sigma == other.sigma
            && self.reference == other.reference
            && self.create_supercells == other.create_supercells
    }
}

impl fmt::Display for ElementScaledRattle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scaled_rattle({})", Param(self.sigma))
    }
}

impl Perturb for ElementScaledRattle {
    fn perturb(&mut self, structure: Structure) -> Result<Structure, PerturbationError> {
        let mut structure = prepare(structure, &self.to_string(), self.create_supercells)?;
        functions::element_scaled_rattle(
            &mut structure,
            self.sigma,
            &self.reference,
            &mut self.rng,
        )?;
        Ok(structure)
    }
}
