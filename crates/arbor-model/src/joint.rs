//! Joint types and their kinematic maps.

use crate::BodyIndex;
use arbor_math::{skew, Real, SpatialTransform, SpatialVec};
use nalgebra::{Matrix3, UnitQuaternion, Vector3};

/// Index of a joint in the model's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointIndex(pub usize);

impl std::fmt::Display for JointIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Joint type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointKind {
    /// 0 DOF rigid attachment.
    Weld,
    /// Single rotational DOF about an axis.
    Revolute,
    /// Single translational DOF along an axis.
    Prismatic,
    /// 3 DOF ball joint, positions stored as exponential coordinates.
    Spherical,
    /// 6 DOF free joint: positions are [x y z; exponential coordinates],
    /// velocities are [angular; linear] in the child frame.
    Free,
}

impl JointKind {
    /// Number of degrees of freedom this kind contributes.
    pub fn ndof(&self) -> usize {
        match self {
            JointKind::Weld => 0,
            JointKind::Revolute | JointKind::Prismatic => 1,
            JointKind::Spherical => 3,
            JointKind::Free => 6,
        }
    }
}

/// A joint connecting a parent body to a child body.
#[derive(Debug, Clone)]
pub struct Joint<T: Real> {
    /// Name of the joint (for diagnostics).
    pub name: String,
    /// Joint type.
    pub kind: JointKind,
    /// The body on the inboard (world) side.
    pub parent: BodyIndex,
    /// The body this joint mobilizes.
    pub child: BodyIndex,
    /// Fixed transform from the parent body frame to the joint frame.
    pub x_parent_joint: SpatialTransform<T>,
    /// Joint axis in the joint frame (revolute/prismatic only; zero otherwise).
    pub axis: Vector3<T>,
    /// Viscous damping coefficient applied per velocity DOF.
    pub damping: T,
    /// Offset of this joint's slice in the generalized position vector.
    pub q_offset: usize,
    /// Offset of this joint's slice in the generalized velocity vector.
    pub v_offset: usize,
}

impl<T: Real> Joint<T> {
    /// Number of degrees of freedom (identical for positions and velocities).
    #[inline]
    pub fn ndof(&self) -> usize {
        self.kind.ndof()
    }

    /// Position-dependent transform from the joint frame to the child frame,
    /// as a function of this joint's position slice (`q.len() == ndof()`).
    pub fn joint_transform(&self, q: &[T]) -> SpatialTransform<T> {
        match self.kind {
            JointKind::Weld => SpatialTransform::identity(),
            JointKind::Revolute => {
                // The child frame has rotated by +q about the axis, so the
                // coordinate transform uses the passive rotation R(-q).
                let (s, c) = (-q[0]).sin_cos();
                let ax = skew(&self.axis);
                let one = <T as Real>::from_f64(1.0);
                let rot = Matrix3::identity() + ax * s + ax * ax * (one - c);
                SpatialTransform::new(rot, Vector3::zeros())
            }
            JointKind::Prismatic => {
                SpatialTransform::new(Matrix3::identity(), self.axis * q[0])
            }
            JointKind::Spherical => {
                let w = Vector3::new(q[0], q[1], q[2]);
                let rot = UnitQuaternion::from_scaled_axis(w)
                    .to_rotation_matrix()
                    .into_inner();
                SpatialTransform::new(rot, Vector3::zeros())
            }
            JointKind::Free => {
                let pos = Vector3::new(q[0], q[1], q[2]);
                let w = Vector3::new(q[3], q[4], q[5]);
                let rot = UnitQuaternion::from_scaled_axis(w)
                    .to_rotation_matrix()
                    .into_inner();
                SpatialTransform::new(rot, pos)
            }
        }
    }

    /// Column `k` of the motion subspace S (6 × ndof), `k < ndof()`.
    pub fn motion_subspace_col(&self, k: usize) -> SpatialVec<T> {
        let zero = <T as Real>::from_f64(0.0);
        let one = <T as Real>::from_f64(1.0);
        match self.kind {
            JointKind::Weld => unreachable!("weld joints have no motion subspace"),
            JointKind::Revolute => SpatialVec::new(self.axis, Vector3::zeros()),
            JointKind::Prismatic => SpatialVec::new(Vector3::zeros(), self.axis),
            JointKind::Spherical => {
                let mut w = Vector3::from_element(zero);
                w[k] = one;
                SpatialVec::new(w, Vector3::zeros())
            }
            JointKind::Free => {
                let mut col = SpatialVec::zero();
                col.data[k] = one;
                col
            }
        }
    }

    /// The joint's own spatial velocity S·q̇ in the child frame, as a closed
    /// form over this joint's velocity slice (`qd.len() == ndof()`).
    pub fn joint_velocity(&self, qd: &[T]) -> SpatialVec<T> {
        match self.kind {
            JointKind::Weld => SpatialVec::zero(),
            JointKind::Revolute => SpatialVec::new(self.axis * qd[0], Vector3::zeros()),
            JointKind::Prismatic => SpatialVec::new(Vector3::zeros(), self.axis * qd[0]),
            JointKind::Spherical => {
                SpatialVec::new(Vector3::new(qd[0], qd[1], qd[2]), Vector3::zeros())
            }
            JointKind::Free => SpatialVec::new(
                Vector3::new(qd[0], qd[1], qd[2]),
                Vector3::new(qd[3], qd[4], qd[5]),
            ),
        }
    }
}
