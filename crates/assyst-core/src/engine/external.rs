//! Seams to the external structure sampler and relaxer.
//!
//! Neither symmetric structure generation nor energy minimization is implemented in
//! this crate. Callers plug in implementations of [`StructureSampler`] and [`Relaxer`]
//! (bindings to a space-group sampler, an interatomic potential, a DFT code, ...).

use super::config::Dimensionality;
use crate::core::filters::tolerance::ToleranceMatrix;
use crate::core::models::structure::Structure;
use crate::core::perturbations::RngHandle;
use thiserror::Error;

/// One call to the sampler: a single composition over a set of symmetry groups.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRequest {
    pub spacegroups: Vec<u32>,
    pub elements: Vec<String>,
    /// Atom count per entry of `elements`, all positive.
    pub counts: Vec<u32>,
    pub dim: Dimensionality,
    /// Minimum pair distances; `None` leaves distances unconstrained.
    pub tolerance: Option<ToleranceMatrix>,
    /// Remaining global budget; `None` is unlimited.
    pub max_results: Option<usize>,
}

pub trait StructureSampler {
    /// Generates structures for the request, drawing randomness from `rng` only.
    ///
    /// Structures for groups incompatible with the composition are simply absent.
    fn sample(&mut self, request: &SampleRequest, rng: &mut RngHandle) -> Vec<Structure>;
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RelaxError {
    #[error("Relaxation did not converge within {steps} steps")]
    NotConverged { steps: usize },
    #[error("Calculator failed: {0}")]
    Calculator(String),
}

pub trait Relaxer {
    /// Relaxes `structure` and attaches the final energy and forces.
    fn relax(&mut self, structure: Structure) -> Result<Structure, RelaxError>;
}
