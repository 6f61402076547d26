use super::functions::{self, PerturbationError};
use super::rng::RngHandle;
use super::{Param, Perturb, prepare};
use crate::core::models::structure::Structure;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_MINIMUM_STRAIN: f64 = 1e-3;

fn default_minimum_strain() -> f64 {
    DEFAULT_MINIMUM_STRAIN
}

/// Deforms the cell by a random symmetric strain; atoms keep their fractional
/// coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stretch {
    /// Upper bound of the diagonal (hydrostatic) strain magnitudes.
    pub hydro: f64,
    /// Upper bound of the off-diagonal (shear) strain magnitudes.
    pub shear: f64,
    #[serde(default = "default_minimum_strain")]
    pub minimum_strain: f64,
    #[serde(default)]
    pub rng: RngHandle,
}

impl Stretch {
    pub fn new(hydro: f64, shear: f64) -> Self {
        Self {
            hydro,
            shear,
            minimum_strain: DEFAULT_MINIMUM_STRAIN,
            rng: RngHandle::from_entropy(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = RngHandle::from_seed(seed);
        self
    }

    pub fn minimum_strain(mut self, minimum_strain: f64) -> Self {
        self.minimum_strain = minimum_strain;
        self
    }
}

impl PartialEq for Stretch {
    fn eq(&self, other: &Self) -> bool {
        self.hydro == other.hydro
            && self.shear == other.shear
            && self.minimum_strain == other.minimum_strain
    }
}

impl fmt::Display for Stretch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stretch(hydro={}, shear={})",
            Param(self.hydro),
            Param(self.shear)
        )
    }
}

impl Perturb for Stretch {
    fn perturb(&mut self, structure: Structure) -> Result<Structure, PerturbationError> {
        let mut structure = prepare(structure, &self.to_string(), false)?;
        functions::stretch(
            &mut structure,
            self.hydro,
            self.shear,
            self.minimum_strain,
            &mut self.rng,
        )?;
        Ok(structure)
    }
}
