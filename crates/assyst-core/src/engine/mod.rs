//! # Engine Module
//!
//! Plumbing shared by the workflows.
//!
//! - **Configuration** ([`config`]) - Sampling and perturbation settings with builders
//! - **Driver** ([`driver`]) - Lazy application of perturbations with filtering and retries
//! - **External seams** ([`external`]) - Traits for the structure sampler and relaxer
//! - **Progress Monitoring** ([`progress`]) - Progress events for user interfaces
//! - **Error Handling** ([`error`]) - Engine-level error aggregation

pub mod config;
pub mod driver;
pub mod error;
pub mod external;
pub mod progress;
