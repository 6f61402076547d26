//! # Core Module
//!
//! Stateless building blocks of the structure generation pipeline.
//!
//! - **Structures** ([`models`]) - Atoms, cells, attached calculation results and metadata
//! - **Compositions** ([`formulas`]) - Stoichiometry lists built from ranges and products
//! - **Predicates** ([`filters`]) - Geometric, distance and energetic filters
//! - **Transformations** ([`perturbations`]) - Seeded rattle and stretch perturbations
//! - **Provenance** ([`lineage`]) - Identity assignment at every mutation point
//! - **Persistence** ([`io`]) - JSON checkpoints of structures and pipeline state
//! - **Reference data** ([`utils`]) - Element radii and cell geometry

pub mod filters;
pub mod formulas;
pub mod io;
pub mod lineage;
pub mod models;
pub mod perturbations;
pub mod utils;
