//! # Filters Module
//!
//! Pure predicates over [`Structure`]s used to prune sampled, relaxed and perturbed
//! structures.
//!
//! - [`geometric`] - Cell aspect ratio and volume per atom
//! - [`distance`] - Minimum interatomic distances under periodic boundary conditions
//! - [`energetic`] - Bounds on attached energies and forces
//! - [`tolerance`] - Named radius presets and tolerance matrices for the sampler
//!
//! Filters are parameters only. They compose with [`Filter::and`] / [`Filter::or`] and
//! serialize as internally tagged objects, e.g. `{"type": "volume",
//! "maximum_volume_per_atom": 25.0}`.

pub mod distance;
pub mod energetic;
pub mod geometric;
pub mod tolerance;

use crate::core::models::structure::Structure;
use serde::{Deserialize, Serialize};

pub use distance::{DistanceFilter, Radii};
pub use energetic::{EnergyFilter, ForceFilter};
pub use geometric::{AspectFilter, VolumeFilter};

/// A predicate deciding whether a structure is kept.
pub trait Evaluate {
    fn evaluate(&self, structure: &Structure) -> bool;
}

impl<F> Evaluate for F
where
    F: Fn(&Structure) -> bool,
{
    fn evaluate(&self, structure: &Structure) -> bool {
        self(structure)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AndFilter {
    pub left: Box<Filter>,
    pub right: Box<Filter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrFilter {
    pub left: Box<Filter>,
    pub right: Box<Filter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Filter {
    Distance(DistanceFilter),
    Aspect(AspectFilter),
    Volume(VolumeFilter),
    Energy(EnergyFilter),
    Force(ForceFilter),
    And(AndFilter),
    Or(OrFilter),
}

impl Filter {
    pub fn and(self, other: impl Into<Filter>) -> Filter {
        Filter::And(AndFilter {
            left: Box::new(self),
            right: Box::new(other.into()),
        })
    }

    pub fn or(self, other: impl Into<Filter>) -> Filter {
        Filter::Or(OrFilter {
            left: Box::new(self),
            right: Box::new(other.into()),
        })
    }
}

impl Evaluate for Filter {
    fn evaluate(&self, structure: &Structure) -> bool {
        match self {
            Filter::Distance(f) => f.evaluate(structure),
            Filter::Aspect(f) => f.evaluate(structure),
            Filter::Volume(f) => f.evaluate(structure),
            Filter::Energy(f) => f.evaluate(structure),
            Filter::Force(f) => f.evaluate(structure),
            Filter::And(f) => {
                Filter::evaluate(&f.left, structure) && Filter::evaluate(&f.right, structure)
            }
            Filter::Or(f) => {
                Filter::evaluate(&f.left, structure) || Filter::evaluate(&f.right, structure)
            }
        }
    }
}

macro_rules! impl_from_filter {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Filter {
                fn from(filter: $ty) -> Self {
                    Filter::$variant(filter)
                }
            }
        )*
    };
}

impl_from_filter!(
    Distance(DistanceFilter),
    Aspect(AspectFilter),
    Volume(VolumeFilter),
    Energy(EnergyFilter),
    Force(ForceFilter),
);
