use super::Evaluate;
use crate::core::models::structure::Structure;
use serde::{Deserialize, Serialize};

/// Keeps structures whose attached energy lies within the (inclusive) bounds.
///
/// Structures without an energy are rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_energy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_energy: Option<f64>,
}

impl EnergyFilter {
    pub fn new(min_energy: Option<f64>, max_energy: Option<f64>) -> Self {
        Self {
            min_energy,
            max_energy,
        }
    }
}

impl Evaluate for EnergyFilter {
    fn evaluate(&self, structure: &Structure) -> bool {
        let Some(energy) = structure.energy() else {
            return false;
        };
        self.min_energy.is_none_or(|min| min <= energy)
            && self.max_energy.is_none_or(|max| energy <= max)
    }
}

/// Keeps structures whose largest force norm does not exceed `max_force`.
///
/// Structures without forces are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceFilter {
    pub max_force: f64,
}

impl ForceFilter {
    pub fn new(max_force: f64) -> Self {
        Self { max_force }
    }
}

impl Evaluate for ForceFilter {
    fn evaluate(&self, structure: &Structure) -> bool {
        structure.forces().is_some_and(|forces| {
            forces
                .iter()
                .map(|f| f.norm())
                .fold(0.0, f64::max)
                <= self.max_force
        })
    }
}
