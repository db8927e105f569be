//! 6D spatial algebra following Featherstone's "Rigid Body Dynamics Algorithms".
//!
//! Convention: spatial vectors are [angular; linear] (Featherstone order).
//! A spatial motion vector (twist): [ω; v]
//! A spatial force vector (wrench): [τ; f]

use crate::{skew, Real};
use nalgebra as na;
use nalgebra::{Matrix3, Matrix6, Vector3, Vector6};

/// 6D spatial vector — either a motion vector (twist) or force vector (wrench).
#[derive(Debug, Clone, Copy)]
pub struct SpatialVec<T: Real> {
    /// The underlying 6D vector [angular(3); linear(3)].
    pub data: Vector6<T>,
}

impl<T: Real> SpatialVec<T> {
    /// Create from angular and linear parts.
    #[inline]
    pub fn new(angular: Vector3<T>, linear: Vector3<T>) -> Self {
        Self {
            data: Vector6::new(
                angular.x, angular.y, angular.z, linear.x, linear.y, linear.z,
            ),
        }
    }

    /// Zero spatial vector.
    #[inline]
    pub fn zero() -> Self {
        Self {
            data: Vector6::zeros(),
        }
    }

    /// Angular (top 3) component.
    #[inline]
    pub fn angular(&self) -> Vector3<T> {
        Vector3::new(self.data[0], self.data[1], self.data[2])
    }

    /// Linear (bottom 3) component.
    #[inline]
    pub fn linear(&self) -> Vector3<T> {
        Vector3::new(self.data[3], self.data[4], self.data[5])
    }

    /// Spatial cross product for motion vectors: v ×ₘ w.
    /// Used in velocity propagation.
    pub fn cross_motion(&self, other: &SpatialVec<T>) -> SpatialVec<T> {
        let w = self.angular();
        let v = self.linear();
        let w2 = other.angular();
        let v2 = other.linear();
        SpatialVec::new(w.cross(&w2), w.cross(&v2) + v.cross(&w2))
    }

    /// Spatial cross product for force vectors: v ×* f.
    /// Used in bias force computation.
    pub fn cross_force(&self, other: &SpatialVec<T>) -> SpatialVec<T> {
        let w = self.angular();
        let v = self.linear();
        let t = other.angular();
        let f = other.linear();
        SpatialVec::new(w.cross(&t) + v.cross(&f), w.cross(&f))
    }

    /// Dot product of two spatial vectors.
    #[inline]
    pub fn dot(&self, other: &SpatialVec<T>) -> T {
        self.data.dot(&other.data)
    }
}

impl<T: Real> std::ops::Add for SpatialVec<T> {
    type Output = SpatialVec<T>;
    #[inline]
    fn add(self, rhs: SpatialVec<T>) -> SpatialVec<T> {
        SpatialVec {
            data: self.data + rhs.data,
        }
    }
}

impl<T: Real> std::ops::Sub for SpatialVec<T> {
    type Output = SpatialVec<T>;
    #[inline]
    fn sub(self, rhs: SpatialVec<T>) -> SpatialVec<T> {
        SpatialVec {
            data: self.data - rhs.data,
        }
    }
}

impl<T: Real> std::ops::Mul<T> for SpatialVec<T> {
    type Output = SpatialVec<T>;
    #[inline]
    fn mul(self, rhs: T) -> SpatialVec<T> {
        SpatialVec {
            data: self.data * rhs,
        }
    }
}

impl<T: Real> std::ops::Neg for SpatialVec<T> {
    type Output = SpatialVec<T>;
    #[inline]
    fn neg(self) -> SpatialVec<T> {
        SpatialVec { data: -self.data }
    }
}

/// 6x6 spatial matrix (inertia operators, transforms acting on spatial vectors).
#[derive(Debug, Clone, Copy)]
pub struct SpatialMat<T: Real> {
    pub data: Matrix6<T>,
}

impl<T: Real> SpatialMat<T> {
    /// Create from a 6x6 nalgebra matrix.
    #[inline]
    pub fn from_mat6(data: Matrix6<T>) -> Self {
        Self { data }
    }

    /// Zero matrix.
    #[inline]
    pub fn zero() -> Self {
        Self {
            data: Matrix6::zeros(),
        }
    }

    /// Multiply by a spatial vector.
    #[inline]
    pub fn mul_vec(&self, v: &SpatialVec<T>) -> SpatialVec<T> {
        SpatialVec {
            data: self.data * v.data,
        }
    }

    /// Largest absolute element; the scale used by relative tolerances.
    pub fn amax(&self) -> T {
        let mut max = <T as Real>::from_f64(0.0);
        for e in self.data.iter() {
            let a = e.abs();
            if a > max {
                max = a;
            }
        }
        max
    }
}

impl<T: Real> std::ops::Add for SpatialMat<T> {
    type Output = SpatialMat<T>;
    #[inline]
    fn add(self, rhs: SpatialMat<T>) -> SpatialMat<T> {
        SpatialMat {
            data: self.data + rhs.data,
        }
    }
}

impl<T: Real> std::ops::Sub for SpatialMat<T> {
    type Output = SpatialMat<T>;
    #[inline]
    fn sub(self, rhs: SpatialMat<T>) -> SpatialMat<T> {
        SpatialMat {
            data: self.data - rhs.data,
        }
    }
}

/// Plücker transform: rigid body transformation acting on spatial vectors.
///
/// Maps coordinates from frame A to frame B. Stored as the rotation R from
/// A to B and the position p of B's origin expressed in A.
#[derive(Debug, Clone, Copy)]
pub struct SpatialTransform<T: Real> {
    /// Rotation from frame A to frame B.
    pub rot: Matrix3<T>,
    /// Position of frame B's origin expressed in frame A.
    pub pos: Vector3<T>,
}

impl<T: Real> SpatialTransform<T> {
    /// Create from rotation matrix and translation.
    pub fn new(rot: Matrix3<T>, pos: Vector3<T>) -> Self {
        Self { rot, pos }
    }

    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            rot: Matrix3::identity(),
            pos: Vector3::zeros(),
        }
    }

    /// Pure translation.
    pub fn translation(pos: Vector3<T>) -> Self {
        Self {
            rot: Matrix3::identity(),
            pos,
        }
    }

    /// Pure rotation about an arbitrary unit axis.
    pub fn rotation(axis: &na::Unit<Vector3<T>>, angle: T) -> Self {
        let rot = na::Rotation3::from_axis_angle(axis, angle);
        Self {
            rot: *rot.matrix(),
            pos: Vector3::zeros(),
        }
    }

    /// The 6x6 Plücker transform matrix for motion vectors.
    ///
    /// X = | R       0 |
    ///     | -R[p]×  R |
    pub fn to_motion_matrix(&self) -> Matrix6<T> {
        let r = self.rot;
        let px = skew(&self.pos);
        let neg_rpx = -r * px;

        let mut m = Matrix6::zeros();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&r);
        m.fixed_view_mut::<3, 3>(3, 0).copy_from(&neg_rpx);
        m.fixed_view_mut::<3, 3>(3, 3).copy_from(&r);
        m
    }

    /// The 6x6 Plücker transform matrix for force vectors.
    ///
    /// X* = | R  -R[p]× |
    ///      | 0    R    |
    pub fn to_force_matrix(&self) -> Matrix6<T> {
        let r = self.rot;
        let px = skew(&self.pos);
        let neg_rpx = -r * px;

        let mut m = Matrix6::zeros();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&r);
        m.fixed_view_mut::<3, 3>(0, 3).copy_from(&neg_rpx);
        m.fixed_view_mut::<3, 3>(3, 3).copy_from(&r);
        m
    }

    /// Transform a spatial motion vector from frame A to frame B.
    pub fn apply_motion(&self, v: &SpatialVec<T>) -> SpatialVec<T> {
        let w = v.angular();
        let vel = v.linear();
        let new_w = self.rot * w;
        let new_v = self.rot * (vel - self.pos.cross(&w));
        SpatialVec::new(new_w, new_v)
    }

    /// Transform a spatial force vector from frame A to frame B.
    pub fn apply_force(&self, f: &SpatialVec<T>) -> SpatialVec<T> {
        let tau = f.angular();
        let force = f.linear();
        let new_f = self.rot * force;
        let new_tau = self.rot * (tau - self.pos.cross(&force));
        SpatialVec::new(new_tau, new_f)
    }

    /// Inverse transform a spatial motion vector (from B back to A).
    pub fn inv_apply_motion(&self, v: &SpatialVec<T>) -> SpatialVec<T> {
        let rt = self.rot.transpose();
        let w = v.angular();
        let vel = v.linear();
        let new_w = rt * w;
        let new_v = rt * vel + self.pos.cross(&(rt * w));
        SpatialVec::new(new_w, new_v)
    }

    /// Inverse transform a spatial force vector (from B back to A).
    pub fn inv_apply_force(&self, f: &SpatialVec<T>) -> SpatialVec<T> {
        let rt = self.rot.transpose();
        let tau = f.angular();
        let force = f.linear();
        let new_f = rt * force;
        let new_tau = rt * tau + self.pos.cross(&(rt * force));
        SpatialVec::new(new_tau, new_f)
    }

    /// Compose two transforms: self ∘ other (other is applied first).
    pub fn compose(&self, other: &SpatialTransform<T>) -> SpatialTransform<T> {
        SpatialTransform {
            rot: self.rot * other.rot,
            pos: other.pos + other.rot.transpose() * self.pos,
        }
    }

    /// Inverse of this transform.
    pub fn inverse(&self) -> SpatialTransform<T> {
        let rt = self.rot.transpose();
        SpatialTransform {
            rot: rt,
            pos: -(self.rot * self.pos),
        }
    }
}

/// Spatial inertia of a rigid body.
///
/// Stored as mass, center-of-mass offset from the body origin, and
/// rotational inertia about the center of mass, all in the body frame.
#[derive(Debug, Clone, Copy)]
pub struct SpatialInertia<T: Real> {
    /// Mass of the body.
    pub mass: T,
    /// Center of mass position in body frame.
    pub com: Vector3<T>,
    /// Rotational inertia about the center of mass (3x3 symmetric).
    pub inertia: Matrix3<T>,
}

impl<T: Real> SpatialInertia<T> {
    /// Create a spatial inertia from mass, CoM offset, and inertia about the CoM.
    pub fn new(mass: T, com: Vector3<T>, inertia: Matrix3<T>) -> Self {
        Self { mass, com, inertia }
    }

    /// The inertia of a massless body.
    pub fn zero() -> Self {
        Self {
            mass: <T as Real>::from_f64(0.0),
            com: Vector3::zeros(),
            inertia: Matrix3::zeros(),
        }
    }

    /// A point mass at the given position.
    pub fn point_mass(mass: T, pos: Vector3<T>) -> Self {
        Self {
            mass,
            com: pos,
            inertia: Matrix3::zeros(),
        }
    }

    /// A uniform solid sphere centered at the origin.
    pub fn sphere(mass: T, radius: T) -> Self {
        let i = <T as Real>::from_f64(2.0 / 5.0) * mass * radius * radius;
        Self {
            mass,
            com: Vector3::zeros(),
            inertia: Matrix3::from_diagonal(&Vector3::new(i, i, i)),
        }
    }

    /// A uniform solid box centered at the origin with the given side lengths.
    pub fn solid_box(mass: T, x: T, y: T, z: T) -> Self {
        let c = mass * <T as Real>::from_f64(1.0 / 12.0);
        Self {
            mass,
            com: Vector3::zeros(),
            inertia: Matrix3::from_diagonal(&Vector3::new(
                c * (y * y + z * z),
                c * (x * x + z * z),
                c * (x * x + y * y),
            )),
        }
    }

    /// A uniform solid cube centered at the origin.
    pub fn solid_cube(mass: T, length: T) -> Self {
        Self::solid_box(mass, length, length, length)
    }

    /// Convert to the 6x6 spatial inertia matrix about the body frame origin.
    ///
    /// I = | I_com + m[c]×[c]×ᵀ  m[c]× |
    ///     | m[c]×ᵀ               m·E  |
    pub fn to_matrix(&self) -> SpatialMat<T> {
        let cx = skew(&self.com);
        let m = self.mass;
        let m_eye = Matrix3::identity() * m;

        let mut mat = Matrix6::zeros();
        let top_left = self.inertia + cx * cx.transpose() * m;
        mat.fixed_view_mut::<3, 3>(0, 0).copy_from(&top_left);
        let mcx = cx * m;
        mat.fixed_view_mut::<3, 3>(0, 3).copy_from(&mcx);
        mat.fixed_view_mut::<3, 3>(3, 0)
            .copy_from(&mcx.transpose());
        mat.fixed_view_mut::<3, 3>(3, 3).copy_from(&m_eye);

        SpatialMat::from_mat6(mat)
    }

    /// Re-express this inertia in a frame rotated by `rot` (coordinates of the
    /// new frame = rot · coordinates of the old frame).
    pub fn re_express(&self, rot: &Matrix3<T>) -> SpatialInertia<T> {
        SpatialInertia {
            mass: self.mass,
            com: rot * self.com,
            inertia: rot * self.inertia * rot.transpose(),
        }
    }

    /// Shift the reference origin by `offset`, expressed in the current frame.
    ///
    /// The stored inertia is about the center of mass, so only the CoM offset
    /// moves; the rotational inertia is unchanged.
    pub fn shift(&self, offset: &Vector3<T>) -> SpatialInertia<T> {
        SpatialInertia {
            mass: self.mass,
            com: self.com - offset,
            inertia: self.inertia,
        }
    }

    /// Express this inertia in frame B, where `xform` maps coordinates from
    /// the current frame to B.
    pub fn transform(&self, xform: &SpatialTransform<T>) -> SpatialInertia<T> {
        self.shift(&xform.pos).re_express(&xform.rot)
    }
}

/// Rigid composition: the inertia of two bodies welded together, about the
/// shared origin.
impl<T: Real> std::ops::Add for SpatialInertia<T> {
    type Output = SpatialInertia<T>;

    fn add(self, rhs: SpatialInertia<T>) -> SpatialInertia<T> {
        let mass = self.mass + rhs.mass;
        let com = if mass > <T as Real>::from_f64(0.0) {
            (self.com * self.mass + rhs.com * rhs.mass) / mass
        } else {
            Vector3::zeros()
        };
        // Parallel-axis both rotational inertias to the combined CoM.
        let shift = |m: T, c: Vector3<T>| -> Matrix3<T> {
            let d = c - com;
            (Matrix3::identity() * d.norm_squared() - d * d.transpose()) * m
        };
        let inertia =
            self.inertia + shift(self.mass, self.com) + rhs.inertia + shift(rhs.mass, rhs.com);
        SpatialInertia { mass, com, inertia }
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use nalgebra::{Rotation3, Unit, Vector3};
    use proptest::prelude::*;

    type Vec3 = Vector3<f64>;

    const EPS: f64 = 1e-9;

    fn arb_pos() -> impl Strategy<Value = Vec3> {
        (-10.0..10.0_f64, -10.0..10.0_f64, -10.0..10.0_f64)
            .prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    fn arb_angle() -> impl Strategy<Value = f64> {
        -std::f64::consts::PI..std::f64::consts::PI
    }

    fn arb_unit_axis() -> impl Strategy<Value = Unit<Vec3>> {
        (-1.0..1.0_f64, -1.0..1.0_f64, -1.0..1.0_f64)
            .prop_filter("non-zero axis", |(x, y, z)| x * x + y * y + z * z > 0.01)
            .prop_map(|(x, y, z)| Unit::new_normalize(Vec3::new(x, y, z)))
    }

    fn arb_transform() -> impl Strategy<Value = SpatialTransform<f64>> {
        (arb_unit_axis(), arb_angle(), arb_pos()).prop_map(|(axis, angle, pos)| {
            let rot = Rotation3::from_axis_angle(&axis, angle);
            SpatialTransform::new(*rot.matrix(), pos)
        })
    }

    fn arb_spatial_vec() -> impl Strategy<Value = SpatialVec<f64>> {
        (arb_pos(), arb_pos()).prop_map(|(a, l)| SpatialVec::new(a, l))
    }

    proptest! {
        #[test]
        fn compose_with_inverse_is_identity(xf in arb_transform()) {
            let result = xf.compose(&xf.inverse());
            let id: SpatialTransform<f64> = SpatialTransform::identity();
            for i in 0..3 {
                for j in 0..3 {
                    prop_assert!((result.rot[(i, j)] - id.rot[(i, j)]).abs() < EPS,
                        "rot[{},{}]: {} vs {}", i, j, result.rot[(i, j)], id.rot[(i, j)]);
                }
            }
            for i in 0..3 {
                prop_assert!((result.pos[i] - id.pos[i]).abs() < EPS,
                    "pos[{}]: {} vs {}", i, result.pos[i], id.pos[i]);
            }
        }

        #[test]
        fn compose_is_associative(
            a in arb_transform(),
            b in arb_transform(),
            c in arb_transform(),
        ) {
            let ab_c = a.compose(&b).compose(&c);
            let a_bc = a.compose(&b.compose(&c));
            for i in 0..3 {
                for j in 0..3 {
                    prop_assert!((ab_c.rot[(i, j)] - a_bc.rot[(i, j)]).abs() < EPS);
                }
            }
            for i in 0..3 {
                prop_assert!((ab_c.pos[i] - a_bc.pos[i]).abs() < EPS);
            }
        }

        #[test]
        fn apply_motion_matches_matrix(xf in arb_transform(), v in arb_spatial_vec()) {
            let applied = xf.apply_motion(&v);
            let mat_result = SpatialMat::from_mat6(xf.to_motion_matrix()).mul_vec(&v);
            for i in 0..6 {
                prop_assert!((applied.data[i] - mat_result.data[i]).abs() < EPS,
                    "component {}: {} vs {}", i, applied.data[i], mat_result.data[i]);
            }
        }

        #[test]
        fn apply_force_matches_matrix(xf in arb_transform(), f in arb_spatial_vec()) {
            let applied = xf.apply_force(&f);
            let mat_result = SpatialMat::from_mat6(xf.to_force_matrix()).mul_vec(&f);
            for i in 0..6 {
                prop_assert!((applied.data[i] - mat_result.data[i]).abs() < EPS,
                    "component {}: {} vs {}", i, applied.data[i], mat_result.data[i]);
            }
        }

        #[test]
        fn inertia_matrix_is_symmetric(
            mass in 0.1..100.0_f64,
            cx in -2.0..2.0_f64,
            cy in -2.0..2.0_f64,
            cz in -2.0..2.0_f64,
        ) {
            let si = SpatialInertia::new(
                mass,
                Vec3::new(cx, cy, cz),
                Matrix3::from_diagonal(&Vec3::new(1.0, 2.0, 3.0)),
            );
            let mat = si.to_matrix().data;
            for i in 0..6 {
                for j in 0..6 {
                    prop_assert!((mat[(i, j)] - mat[(j, i)]).abs() < 1e-9 * mass.max(1.0),
                        "not symmetric at ({},{}): {} vs {}", i, j, mat[(i, j)], mat[(j, i)]);
                }
            }
        }
    }
}
