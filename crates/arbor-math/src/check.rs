//! Validity guards for unit vectors and rotation matrices.
//!
//! Near-unit and near-orthonormal inputs are common after repeated
//! floating-point composition, so failures carry the measured quantities and
//! a concrete remedy rather than a bare "invalid input". Guards are raised at
//! the point of use; the `warn_*` variants log instead of failing, for call
//! sites where an error would be disruptive (background diagnostics).

use crate::{tolerances, Real};
use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

/// A malformed vector or rotation matrix was passed to a kinematic operation.
#[derive(Debug, Clone, Error)]
pub enum InvalidArgumentError {
    #[error(
        "the vector [{x} {y} {z}] is not a unit vector: |v| = {magnitude}, \
         ||v| - 1| = {deviation} is greater than the allowed tolerance {tolerance}. \
         To normalize a vector v, consider v.normalize()."
    )]
    NotUnitVector {
        x: f64,
        y: f64,
        z: f64,
        magnitude: f64,
        deviation: f64,
        tolerance: f64,
    },

    #[error("rotation matrix contains an element that is infinity or NaN")]
    NonFiniteRotation,

    #[error(
        "rotation matrix is not orthonormal. Measure of orthonormality error: \
         {measure} (near-zero is good). To fix, re-orthogonalize the matrix, \
         e.g. with an SVD-based orthogonal projection, or renormalize the \
         quaternion it came from."
    )]
    NotOrthonormal { measure: f64 },

    #[error("rotation matrix determinant is negative; the basis may be left-handed")]
    NegativeDeterminant,
}

pub type Result<T> = std::result::Result<T, InvalidArgumentError>;

/// Check that `v` is a unit vector within `tol` of magnitude 1.
///
/// Returns the squared norm on success. Fails when any component is
/// non-finite (the reported magnitude is then NaN or infinity) or when the
/// magnitude deviates from 1 by more than `tol`.
pub fn check_unit_vector<T: Real>(v: &Vector3<T>, tol: f64) -> Result<T> {
    let norm_squared = v.norm_squared();
    let magnitude = norm_squared.to_f64().sqrt();
    let deviation = (magnitude - 1.0).abs();
    // `!(deviation <= tol)` also catches NaN magnitudes.
    if !v.iter().all(|e| e.is_finite()) || !(deviation <= tol) {
        return Err(InvalidArgumentError::NotUnitVector {
            x: v.x.to_f64(),
            y: v.y.to_f64(),
            z: v.z.to_f64(),
            magnitude,
            deviation,
            tolerance: tol,
        });
    }
    Ok(norm_squared)
}

/// Soft variant of [`check_unit_vector`]: logs a warning instead of failing
/// and always returns the squared norm.
pub fn warn_unit_vector<T: Real>(v: &Vector3<T>, tol: f64) -> T {
    if let Err(e) = check_unit_vector(v, tol) {
        log::warn!("{e}");
    }
    v.norm_squared()
}

/// Check that `r` is a valid rotation matrix: finite, orthonormal within the
/// internal tolerance, and right-handed.
pub fn check_rotation_matrix<T: Real>(r: &Matrix3<T>) -> Result<()> {
    if !r.iter().all(|e| e.is_finite()) {
        return Err(InvalidArgumentError::NonFiniteRotation);
    }
    let measure = (r * r.transpose() - Matrix3::identity()).norm().to_f64();
    if measure > tolerances::ORTHONORMALITY {
        return Err(InvalidArgumentError::NotOrthonormal { measure });
    }
    if r.determinant() < <T as Real>::from_f64(0.0) {
        return Err(InvalidArgumentError::NegativeDeterminant);
    }
    Ok(())
}

/// Soft variant of [`check_rotation_matrix`]: logs a warning instead of
/// failing and reports whether the matrix was valid.
pub fn warn_rotation_matrix<T: Real>(r: &Matrix3<T>) -> bool {
    match check_rotation_matrix(r) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("{e}");
            false
        }
    }
}
