use thiserror::Error;

use super::config::ConfigError;
use crate::core::filters::tolerance::ToleranceError;
use crate::core::formulas::FormulaError;
use crate::core::io::checkpoint::CheckpointError;
use crate::core::models::structure::StructureError;

/// Invalid sampling request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SamplingError {
    #[error("Dimensionality must be 0, 1, 2 or 3, got {0}")]
    InvalidDimensionality(u8),

    #[error("Group {group} is outside 1..={max} for dimensionality {dim}")]
    SpaceGroupOutOfRange { group: u32, dim: u8, max: u32 },

    #[error("No space groups given")]
    EmptySpaceGroups,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Invalid formula: {source}")]
    Formula {
        #[from]
        source: FormulaError,
    },

    #[error("Invalid sampling request: {source}")]
    Sampling {
        #[from]
        source: SamplingError,
    },

    #[error("Invalid tolerance: {source}")]
    Tolerance {
        #[from]
        source: ToleranceError,
    },

    #[error("Invalid structure: {source}")]
    Structure {
        #[from]
        source: StructureError,
    },

    #[error("Checkpoint failed: {source}")]
    Checkpoint {
        #[from]
        source: CheckpointError,
    },
}
