//! Cell geometry helpers.
//!
//! Cells are stored as 3×3 matrices whose *rows* are the lattice vectors, so a
//! fractional coordinate `f` maps to the Cartesian position `cellᵀ · f`.

use nalgebra::{Matrix3, Point3, Vector3};

pub fn cell_lengths(cell: &Matrix3<f64>) -> [f64; 3] {
    [cell.row(0).norm(), cell.row(1).norm(), cell.row(2).norm()]
}

pub fn cell_volume(cell: &Matrix3<f64>) -> f64 {
    cell.determinant().abs()
}

pub fn to_cartesian(cell: &Matrix3<f64>, fractional: &Vector3<f64>) -> Point3<f64> {
    Point3::from(cell.transpose() * fractional)
}

/// Returns `None` for singular cells.
pub fn to_fractional(cell: &Matrix3<f64>, position: &Point3<f64>) -> Option<Vector3<f64>> {
    cell.transpose()
        .try_inverse()
        .map(|inverse| inverse * position.coords)
}

/// Number of periodic images to visit along each axis so that every image closer than
/// `cutoff` to a wrapped difference vector is covered.
///
/// Non-periodic axes get zero images. Returns `None` for singular cells.
pub fn image_counts(cell: &Matrix3<f64>, pbc: [bool; 3], cutoff: f64) -> Option<[i32; 3]> {
    let inverse = cell.try_inverse()?;
    let mut counts = [0; 3];
    for (axis, count) in counts.iter_mut().enumerate() {
        if pbc[axis] {
            // column k of the inverse is the reciprocal vector b_k; 1/|b_k| is the
            // spacing of the lattice planes spanned by the other two vectors.
            let reciprocal_norm = inverse.column(axis).norm();
            *count = (cutoff * reciprocal_norm).ceil().max(1.0) as i32;
        }
    }
    Some(counts)
}
