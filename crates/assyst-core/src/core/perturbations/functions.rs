//! In-place perturbation primitives.
//!
//! These only move atoms or deform the cell. They neither tag the structure with the
//! perturbation applied nor change its identity; the perturbation types do that.

use super::rng::RngHandle;
use crate::core::models::structure::Structure;
use nalgebra::{Matrix3, Vector3};
use std::collections::BTreeMap;
use thiserror::Error;

/// A perturbation cannot be applied to this structure.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PerturbationError {
    #[error("Cannot rattle a single atom without creating a supercell")]
    SingleAtom,
    #[error("Reference length for '{element}' must be positive, got {value}")]
    NonPositiveReference { element: String, value: f64 },
    #[error("No reference length given for element '{element}'")]
    MissingReference { element: String },
    #[error("Cannot stretch a structure without a cell")]
    MissingCell,
    #[error("Cannot stretch a structure with a singular cell")]
    SingularCell,
    #[error("Invalid structure: {0}")]
    Structure(#[from] crate::core::models::structure::StructureError),
}

/// Adds independent normal noise with standard deviation `sigma` to every Cartesian
/// coordinate.
pub fn rattle(
    structure: &mut Structure,
    sigma: f64,
    rng: &mut RngHandle,
) -> Result<(), PerturbationError> {
    if structure.len() == 1 {
        return Err(PerturbationError::SingleAtom);
    }
    for position in structure.positions_mut() {
        let noise = Vector3::new(rng.gaussian(), rng.gaussian(), rng.gaussian());
        *position += noise * sigma;
    }
    Ok(())
}

/// Rejects non-positive reference lengths.
pub fn check_reference(reference: &BTreeMap<String, f64>) -> Result<(), PerturbationError> {
    match reference.iter().find(|(_, value)| **value <= 0.0) {
        Some((element, value)) => Err(PerturbationError::NonPositiveReference {
            element: element.clone(),
            value: *value,
        }),
        None => Ok(()),
    }
}

/// Like [`rattle`], but the standard deviation of each atom is `sigma` times the
/// reference length of its element.
pub fn element_scaled_rattle(
    structure: &mut Structure,
    sigma: f64,
    reference: &BTreeMap<String, f64>,
    rng: &mut RngHandle,
) -> Result<(), PerturbationError> {
    check_reference(reference)?;
    let scales = structure
        .symbols()
        .iter()
        .map(|symbol| {
            reference
                .get(symbol)
                .map(|length| sigma * length)
                .ok_or_else(|| PerturbationError::MissingReference {
                    element: symbol.clone(),
                })
        })
        .collect::<Result<Vec<f64>, _>>()?;
    if structure.len() == 1 {
        return Err(PerturbationError::SingleAtom);
    }
    for (position, scale) in structure.positions_mut().iter_mut().zip(scales) {
        let noise = Vector3::new(rng.gaussian(), rng.gaussian(), rng.gaussian());
        *position += noise * scale;
    }
    Ok(())
}

/// Applies a random symmetric strain to the cell, keeping fractional coordinates.
///
/// Off-diagonal components have magnitudes in `[minimum_strain, shear)`, diagonal
/// components `1 + s` with `|s|` in `[minimum_strain, hydro)`; signs are random.
pub fn stretch(
    structure: &mut Structure,
    hydro: f64,
    shear: f64,
    minimum_strain: f64,
    rng: &mut RngHandle,
) -> Result<(), PerturbationError> {
    let cell = *structure.cell().ok_or(PerturbationError::MissingCell)?;
    if cell.try_inverse().is_none() {
        return Err(PerturbationError::SingularCell);
    }
    let strain = random_strain(hydro, shear, minimum_strain, rng);
    structure.set_cell(cell * strain, true)?;
    Ok(())
}

fn random_strain(hydro: f64, shear: f64, minimum_strain: f64, rng: &mut RngHandle) -> Matrix3<f64> {
    let mut strain = Matrix3::zeros();

    let signs: [f64; 3] = std::array::from_fn(|_| rng.sign());
    let magnitudes: [f64; 3] = std::array::from_fn(|_| rng.uniform_in(minimum_strain, shear));
    for (k, (row, col)) in [(0, 1), (0, 2), (1, 2)].into_iter().enumerate() {
        let s = signs[k] * magnitudes[k];
        strain[(row, col)] = s;
        strain[(col, row)] = s;
    }

    let signs: [f64; 3] = std::array::from_fn(|_| rng.sign());
    let magnitudes: [f64; 3] = std::array::from_fn(|_| rng.uniform_in(minimum_strain, hydro));
    for k in 0..3 {
        strain[(k, k)] = 1.0 + signs[k] * magnitudes[k];
    }
    strain
}
