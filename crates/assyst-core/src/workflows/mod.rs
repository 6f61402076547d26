//! # Workflows Module
//!
//! High-level entry points that chain the engine into the stages of a training set
//! run:
//!
//! - **Sampling** ([`sample`]) turns a list of stoichiometries into symmetric seed
//!   structures through an external [`StructureSampler`](crate::engine::external::StructureSampler).
//! - **Relaxation** ([`relax`]) hands structures to an external
//!   [`Relaxer`](crate::engine::external::Relaxer) and keeps the ones that succeed.
//! - **Perturbation** ([`perturb`]) prefilters inputs, then applies every configured
//!   perturbation under the acceptance filters, reporting progress phase by phase.
//!
//! Every stage assigns new identities to the structures it produces, so lineage
//! chains record the full path from seed to final structure.

pub mod perturb;
pub mod relax;
pub mod sample;
