//! Spatial algebra and math primitives for the arbor dynamics engine.
//!
//! Implements 6D spatial vectors, Plücker transforms, and spatial inertia
//! following Featherstone's conventions, together with the validity guards
//! used to reject malformed rotations and axes before they reach the
//! kinematics.

pub mod check;
pub mod real;
pub mod spatial;

pub use check::{
    check_rotation_matrix, check_unit_vector, warn_rotation_matrix, warn_unit_vector,
    InvalidArgumentError,
};
pub use real::Real;
pub use spatial::{SpatialInertia, SpatialMat, SpatialTransform, SpatialVec};

use nalgebra::{Matrix3, Vector3};

/// Cross-product matrix: [v]× such that [v]× w = v × w.
#[inline]
pub fn skew<T: Real>(v: &Vector3<T>) -> Matrix3<T> {
    let o = <T as Real>::from_f64(0.0);
    Matrix3::new(o, -v.z, v.y, v.z, o, -v.x, -v.y, v.x, o)
}

/// Standard gravity (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Internal tolerances for the validity guards.
///
/// Near-orthonormal and near-unit inputs are common after repeated
/// floating-point composition; these scales are validated by the guard
/// boundary tests rather than chosen per call site.
pub mod tolerances {
    /// Allowed Frobenius-norm deviation of R·Rᵀ from the identity.
    pub const ORTHONORMALITY: f64 = 128.0 * f64::EPSILON;

    /// Default allowed deviation of a unit vector's magnitude from 1.
    pub const UNIT_VECTOR: f64 = 1.0e-14;
}
