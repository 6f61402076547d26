use super::Evaluate;
use crate::core::models::structure::Structure;
use serde::{Deserialize, Serialize};

/// Rejects cells whose longest lattice vector exceeds `maximum_aspect_ratio` times the
/// shortest. Structures without a cell pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectFilter {
    pub maximum_aspect_ratio: f64,
}

impl AspectFilter {
    pub fn new(maximum_aspect_ratio: f64) -> Self {
        Self {
            maximum_aspect_ratio,
        }
    }
}

impl Default for AspectFilter {
    fn default() -> Self {
        Self::new(6.0)
    }
}

impl Evaluate for AspectFilter {
    fn evaluate(&self, structure: &Structure) -> bool {
        let Some(lengths) = structure.cell_lengths() else {
            return true;
        };
        let longest = lengths.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let shortest = lengths.iter().copied().fold(f64::INFINITY, f64::min);
        longest / shortest <= self.maximum_aspect_ratio
    }
}

/// Rejects cells with more than `maximum_volume_per_atom` Å³ per atom. Structures
/// without a cell pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeFilter {
    pub maximum_volume_per_atom: f64,
}

impl VolumeFilter {
    pub fn new(maximum_volume_per_atom: f64) -> Self {
        Self {
            maximum_volume_per_atom,
        }
    }
}

impl Evaluate for VolumeFilter {
    fn evaluate(&self, structure: &Structure) -> bool {
        match structure.volume() {
            Some(volume) if !structure.is_empty() => {
                volume / structure.len() as f64 <= self.maximum_volume_per_atom
            }
            _ => true,
        }
    }
}
