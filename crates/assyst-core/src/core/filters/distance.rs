use super::Evaluate;
use super::tolerance::{ToleranceMatrix, TolerancePreset};
use crate::core::models::structure::Structure;
use crate::core::utils::geometry;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where per-element radii come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Radii {
    Preset(TolerancePreset),
    /// Elements missing from the map have radius zero.
    Explicit(BTreeMap<String, f64>),
}

impl Radii {
    pub fn radius(&self, element: &str) -> f64 {
        match self {
            Self::Preset(preset) => preset.radius(element).unwrap_or(0.0),
            Self::Explicit(map) => map.get(element).copied().unwrap_or(0.0),
        }
    }

    /// `None` for an empty explicit map, which constrains nothing.
    pub fn to_tolerance_matrix(&self, elements: &[&str]) -> Option<ToleranceMatrix> {
        if let Self::Explicit(map) = self {
            if map.is_empty() {
                return None;
            }
        }
        Some(ToleranceMatrix::from_radii(
            elements.iter().copied(),
            |e| self.radius(e),
        ))
    }

    fn is_unconstrained(&self) -> bool {
        matches!(self, Self::Explicit(map) if map.is_empty())
    }
}

/// Rejects structures with two atoms closer than the sum of their radii.
///
/// Distances are taken under periodic boundary conditions along periodic axes, and an
/// atom's own periodic images count as neighbours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceFilter {
    pub radii: Radii,
}

impl DistanceFilter {
    pub fn new(radii: Radii) -> Self {
        Self { radii }
    }

    pub fn preset(preset: TolerancePreset) -> Self {
        Self::new(Radii::Preset(preset))
    }

    pub fn explicit(radii: BTreeMap<String, f64>) -> Self {
        Self::new(Radii::Explicit(radii))
    }

    pub fn to_tolerance_matrix(&self, elements: &[&str]) -> Option<ToleranceMatrix> {
        self.radii.to_tolerance_matrix(elements)
    }
}

impl Default for DistanceFilter {
    fn default() -> Self {
        Self::preset(TolerancePreset::Metallic)
    }
}

impl Evaluate for DistanceFilter {
    fn evaluate(&self, structure: &Structure) -> bool {
        if self.radii.is_unconstrained() {
            return true;
        }
        let radii: Vec<f64> = structure
            .symbols()
            .iter()
            .map(|s| self.radii.radius(s))
            .collect();
        let cutoff = 2.0 * radii.iter().copied().fold(0.0, f64::max);
        if cutoff <= 0.0 {
            return true;
        }

        let pbc = structure.pbc();
        let lattice = structure.cell().filter(|_| pbc.iter().any(|&p| p)).and_then(|cell| {
            let images = geometry::image_counts(cell, pbc, cutoff)?;
            let to_fractional = cell.transpose().try_inverse()?;
            Some(Lattice {
                to_cartesian: cell.transpose(),
                to_fractional,
                pbc,
                images,
            })
        });

        let positions = structure.positions();
        for i in 0..positions.len() {
            for j in i..positions.len() {
                let minimum = radii[i] + radii[j];
                let delta = positions[j] - positions[i];
                let too_close = match &lattice {
                    Some(lattice) => lattice.any_image_closer(&delta, minimum, i == j),
                    None => i != j && delta.norm() < minimum,
                };
                if too_close {
                    return false;
                }
            }
        }
        true
    }
}

struct Lattice {
    to_cartesian: Matrix3<f64>,
    to_fractional: Matrix3<f64>,
    pbc: [bool; 3],
    images: [i32; 3],
}

impl Lattice {
    fn any_image_closer(&self, delta: &Vector3<f64>, minimum: f64, same_atom: bool) -> bool {
        let mut fractional = self.to_fractional * delta;
        for axis in 0..3 {
            if self.pbc[axis] {
                fractional[axis] -= fractional[axis].round();
            }
        }
        let [na, nb, nc] = self.images;
        for a in -na..=na {
            for b in -nb..=nb {
                for c in -nc..=nc {
                    if same_atom && a == 0 && b == 0 && c == 0 {
                        continue;
                    }
                    let shifted = fractional + Vector3::new(a as f64, b as f64, c as f64);
                    if (self.to_cartesian * shifted).norm() < minimum {
                        return true;
                    }
                }
            }
        }
        false
    }
}
