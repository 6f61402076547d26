use super::error::SamplingError;
use crate::core::filters::Filter;
use crate::core::filters::tolerance::Tolerance;
use crate::core::perturbations::Perturbation;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const DEFAULT_RETRIES: usize = 10;
pub const DEFAULT_MIN_ATOMS: u32 = 1;
pub const DEFAULT_MAX_ATOMS: u32 = 10;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Periodicity of sampled structures: clusters, rods, layers or bulk crystals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Dimensionality {
    Zero,
    One,
    Two,
    #[default]
    Three,
}

impl Dimensionality {
    /// Highest symmetry group number available in this dimensionality (point, rod,
    /// layer and space groups respectively).
    pub fn max_group(self) -> u32 {
        match self {
            Self::Zero => 58,
            Self::One => 75,
            Self::Two => 80,
            Self::Three => 230,
        }
    }
}

impl TryFrom<u8> for Dimensionality {
    type Error = SamplingError;

    fn try_from(dim: u8) -> Result<Self, Self::Error> {
        match dim {
            0 => Ok(Self::Zero),
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(SamplingError::InvalidDimensionality(other)),
        }
    }
}

impl From<Dimensionality> for u8 {
    fn from(dim: Dimensionality) -> Self {
        dim as u8
    }
}

impl fmt::Display for Dimensionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    /// Groups to sample from; `None` means every group of the dimensionality.
    pub spacegroups: Option<Vec<u32>>,
    pub min_atoms: u32,
    pub max_atoms: u32,
    /// Global budget over all formulas.
    pub max_structures: Option<usize>,
    pub dim: Dimensionality,
    pub tolerance: Tolerance,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            spacegroups: None,
            min_atoms: DEFAULT_MIN_ATOMS,
            max_atoms: DEFAULT_MAX_ATOMS,
            max_structures: None,
            dim: Dimensionality::default(),
            tolerance: Tolerance::default(),
        }
    }
}

#[derive(Default)]
pub struct SamplingConfigBuilder {
    spacegroups: Option<Vec<u32>>,
    min_atoms: Option<u32>,
    max_atoms: Option<u32>,
    max_structures: Option<usize>,
    dim: Option<Dimensionality>,
    tolerance: Option<Tolerance>,
}

impl SamplingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spacegroups(mut self, groups: Vec<u32>) -> Self {
        self.spacegroups = Some(groups);
        self
    }
    pub fn min_atoms(mut self, n: u32) -> Self {
        self.min_atoms = Some(n);
        self
    }
    pub fn max_atoms(mut self, n: u32) -> Self {
        self.max_atoms = Some(n);
        self
    }
    pub fn max_structures(mut self, n: usize) -> Self {
        self.max_structures = Some(n);
        self
    }
    pub fn dim(mut self, dim: Dimensionality) -> Self {
        self.dim = Some(dim);
        self
    }
    pub fn tolerance(mut self, tolerance: impl Into<Tolerance>) -> Self {
        self.tolerance = Some(tolerance.into());
        self
    }

    pub fn build(self) -> Result<SamplingConfig, ConfigError> {
        let min_atoms = self.min_atoms.unwrap_or(DEFAULT_MIN_ATOMS);
        let max_atoms = self.max_atoms.unwrap_or(DEFAULT_MAX_ATOMS);
        if min_atoms > max_atoms {
            return Err(ConfigError::InvalidParameter {
                name: "min_atoms",
                reason: format!("{min_atoms} exceeds max_atoms = {max_atoms}"),
            });
        }
        Ok(SamplingConfig {
            spacegroups: self.spacegroups,
            min_atoms,
            max_atoms,
            max_structures: self.max_structures,
            dim: self.dim.unwrap_or_default(),
            tolerance: self.tolerance.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerturbationConfig {
    pub perturbations: Vec<Perturbation>,
    /// Applied to the inputs before perturbing.
    pub prefilters: Vec<Filter>,
    /// Applied to every perturbed candidate.
    pub filters: Vec<Filter>,
    pub retries: usize,
}

#[derive(Default)]
pub struct PerturbationConfigBuilder {
    perturbations: Vec<Perturbation>,
    prefilters: Vec<Filter>,
    filters: Vec<Filter>,
    retries: Option<usize>,
}

impl PerturbationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn perturbation(mut self, perturbation: impl Into<Perturbation>) -> Self {
        self.perturbations.push(perturbation.into());
        self
    }
    pub fn perturbations(mut self, perturbations: Vec<Perturbation>) -> Self {
        self.perturbations = perturbations;
        self
    }
    pub fn prefilter(mut self, filter: impl Into<Filter>) -> Self {
        self.prefilters.push(filter.into());
        self
    }
    pub fn prefilters(mut self, filters: Vec<Filter>) -> Self {
        self.prefilters = filters;
        self
    }
    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filters.push(filter.into());
        self
    }
    pub fn filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }
    pub fn retries(mut self, retries: usize) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn build(self) -> Result<PerturbationConfig, ConfigError> {
        if self.perturbations.is_empty() {
            return Err(ConfigError::MissingParameter("perturbations"));
        }
        let retries = self.retries.unwrap_or(DEFAULT_RETRIES);
        if retries == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "retries",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(PerturbationConfig {
            perturbations: self.perturbations,
            prefilters: self.prefilters,
            filters: self.filters,
            retries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filters::VolumeFilter;
    use crate::core::filters::tolerance::TolerancePreset;
    use crate::core::perturbations::Rattle;

    #[test]
    fn sampling_defaults() {
        let config = SamplingConfigBuilder::new().build().unwrap();
        assert_eq!(config, SamplingConfig::default());
        assert_eq!(config.min_atoms, 1);
        assert_eq!(config.max_atoms, 10);
        assert_eq!(config.dim, Dimensionality::Three);
        assert_eq!(config.tolerance, Tolerance::Preset(TolerancePreset::Metallic));
    }

    #[test]
    fn sampling_rejects_inverted_atom_bounds() {
        let err = SamplingConfigBuilder::new()
            .min_atoms(5)
            .max_atoms(2)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "min_atoms",
                ..
            }
        ));
    }

    #[test]
    fn dimensionality_conversion() {
        assert_eq!(Dimensionality::try_from(2).unwrap(), Dimensionality::Two);
        assert_eq!(
            Dimensionality::try_from(4).unwrap_err(),
            SamplingError::InvalidDimensionality(4)
        );
        assert_eq!(Dimensionality::One.max_group(), 75);
        let dim: Dimensionality = serde_json::from_str("0").unwrap();
        assert_eq!(dim, Dimensionality::Zero);
        assert!(serde_json::from_str::<Dimensionality>("7").is_err());
    }

    #[test]
    fn perturbation_config_requires_perturbations() {
        assert_eq!(
            PerturbationConfigBuilder::new().build().unwrap_err(),
            ConfigError::MissingParameter("perturbations")
        );
    }

    #[test]
    fn perturbation_config_defaults_retries() {
        let config = PerturbationConfigBuilder::new()
            .perturbation(Rattle::new(0.1))
            .filter(VolumeFilter::new(30.0))
            .build()
            .unwrap();
        assert_eq!(config.retries, DEFAULT_RETRIES);
        assert_eq!(config.filters.len(), 1);
        assert!(config.prefilters.is_empty());

        assert!(matches!(
            PerturbationConfigBuilder::new()
                .perturbation(Rattle::new(0.1))
                .retries(0)
                .build(),
            Err(ConfigError::InvalidParameter { name: "retries", .. })
        ));
    }
}
