//! # ASSYST Core Library
//!
//! Generation of training structures for machine-learning interatomic potentials:
//! symmetric random structures are sampled for a list of compositions, filtered,
//! relaxed, randomly perturbed and filtered again, while every structure records the
//! chain of identities it passed through.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Structure model, stoichiometry algebra, filter
//!   predicates, perturbations with serializable generator state, identity tracking
//!   and JSON persistence. Nothing here performs I/O besides [`core::io`].
//!
//! - **[`engine`]: The Plumbing.** Configuration builders, error aggregation, progress
//!   reporting, the seams to the external sampler and relaxer, and the lazy
//!   [`apply_perturbations`](engine::driver::apply_perturbations) driver.
//!
//! - **[`workflows`]: The Public API.** Sampling per composition, relaxation, and the
//!   prefilter/perturb pipeline used by the command line front end.

pub mod core;
pub mod engine;
pub mod workflows;
