use crate::core::lineage::assign_new_identity;
use crate::core::models::structure::Structure;
use crate::engine::external::Relaxer;
use tracing::warn;

/// Lazily relaxes `structures`, giving every relaxed structure a new identity.
///
/// Structures the relaxer fails on are logged and dropped; the rest of the stream
/// continues.
pub fn relax<'a, R, I>(relaxer: &'a mut R, structures: I) -> impl Iterator<Item = Structure> + 'a
where
    R: Relaxer,
    I: IntoIterator<Item = Structure>,
    I::IntoIter: 'a,
{
    structures.into_iter().filter_map(move |structure| {
        let uuid = structure.info().uuid.clone();
        match relaxer.relax(structure) {
            Ok(mut relaxed) => {
                assign_new_identity(&mut relaxed);
                Some(relaxed)
            }
            Err(e) => {
                warn!(uuid = uuid.as_deref(), error = %e, "Relaxation failed, dropping structure.");
                None
            }
        }
    })
}
