//! Persistence of pipeline objects.
//!
//! Structures, filters and perturbations are stored as JSON. Perturbations carry their
//! generator state, so a stored file acts as a checkpoint of a running pipeline.

pub mod checkpoint;
