//! # Core Models Module
//!
//! Data structures for atomic structures as they travel through the pipeline.
//!
//! - [`structure`] - Species, positions, periodic cell and attached calculation results
//! - [`info`] - Identity, provenance and free-form metadata carried by every structure

pub mod info;
pub mod structure;
