//! Structure identity tracking.
//!
//! Every mutation point in the pipeline gives the structure a fresh `uuid`. The previous
//! identifier moves to the end of `lineage`, and `seed` remembers the very first one, so
//! any output structure can be traced back through all intermediate stages.

use crate::core::models::structure::Structure;
use std::sync::Arc;
use uuid::Uuid;

pub fn fresh_identifier() -> String {
    Uuid::new_v4().to_string()
}

/// Gives `structure` a new identity, recording the old one in its lineage.
///
/// The lineage slice is replaced rather than extended, so copies of the same parent
/// keep independent histories.
pub fn assign_new_identity(structure: &mut Structure) {
    let info = structure.info_mut();
    if let Some(previous) = info.uuid.take() {
        let lineage: Arc<[String]> = info
            .lineage()
            .iter()
            .cloned()
            .chain(std::iter::once(previous))
            .collect();
        info.lineage = Some(lineage);
    }
    let uuid = fresh_identifier();
    if info.seed.is_none() {
        info.seed = Some(uuid.clone());
    }
    info.uuid = Some(uuid);
}
