//! Scalar abstraction for the dynamics algorithms.

use nalgebra::RealField;

/// Scalar field the algorithms are written over.
///
/// `f64` and `f32` implement it out of the box; a forward-mode dual type can
/// participate by implementing the three conversions. Finiteness checks come
/// from `ComplexField::is_finite`, so a total field pays nothing extra.
pub trait Real: RealField + Copy {
    /// Convert a constant expressed as `f64` into this field.
    fn from_f64(value: f64) -> Self;

    /// Extract the value as `f64`, for diagnostics and error messages.
    fn to_f64(self) -> f64;

    /// Machine epsilon of this field.
    fn epsilon() -> Self;
}

impl Real for f64 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn epsilon() -> Self {
        f64::EPSILON
    }
}

impl Real for f32 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn epsilon() -> Self {
        f32::EPSILON
    }
}
