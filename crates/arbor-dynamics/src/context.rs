//! Per-instance evaluation context: generalized state plus memoized caches.
//!
//! Invalidation is an explicit version protocol rather than dirty bits: each
//! source of cached data (positions, velocities, body parameters) carries a
//! monotonically increasing counter, and every cache records the counter
//! values it was computed from. A cache is valid iff its recorded versions
//! match the current ones.

use arbor_math::{Real, SpatialInertia, SpatialMat, SpatialTransform, SpatialVec};
use arbor_model::{BodyIndex, Model};
use nalgebra::{DVector, Matrix6, SVector};

/// Current version of each cached-data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Versions {
    pub q: u64,
    pub v: u64,
    pub params: u64,
}

/// Cached position kinematics: pure function of (topology, q).
#[derive(Debug, Clone)]
pub(crate) struct PositionCache<T: Real> {
    /// Per body: Plücker transform from the parent body frame to this body.
    pub x_parent: Vec<SpatialTransform<T>>,
    /// Per body: Plücker transform from the world frame to this body.
    pub x_world: Vec<SpatialTransform<T>>,
    /// `q` version this was computed from.
    pub stamp: Option<u64>,
}

/// Cached velocity kinematics: pure function of (topology, q, v).
#[derive(Debug, Clone)]
pub(crate) struct VelocityCache<T: Real> {
    /// Per body: spatial velocity in the body frame.
    pub vel: Vec<SpatialVec<T>>,
    /// Per body: the parent joint's own contribution S·q̇.
    pub vj: Vec<SpatialVec<T>>,
    /// Per body: velocity-product bias v ×ₘ S·q̇.
    pub c_bias: Vec<SpatialVec<T>>,
    /// (q, v) versions this was computed from.
    pub stamp: Option<(u64, u64)>,
}

/// Cached articulated-body inertias: pure function of (topology, q, params).
#[derive(Debug, Clone)]
pub(crate) struct AbiCache<T: Real> {
    /// Per body: complete articulated body inertia P (children eliminated).
    pub p_art: Vec<SpatialMat<T>>,
    /// Per body: hinge projection columns U = P·S (first ndof entries used).
    pub u: Vec<[SpatialVec<T>; 6]>,
    /// Per body: in-place Cholesky factor of the hinge inertia D = Sᵀ·U,
    /// stored in the leading ndof×ndof block.
    pub d_l: Vec<Matrix6<T>>,
    /// (q, params) versions this was computed from.
    pub stamp: Option<(u64, u64)>,
}

/// Preallocated buffers for the per-evaluation ABA passes, so steady-state
/// stepping does not allocate.
#[derive(Debug, Clone)]
pub(crate) struct Workspace<T: Real> {
    /// Articulated bias forces z.
    pub z: Vec<SpatialVec<T>>,
    /// Per body: u = τ − Sᵀz for the parent joint (first ndof entries used).
    pub u_bias: Vec<SVector<T, 6>>,
    /// Spatial accelerations.
    pub accel: Vec<SpatialVec<T>>,
}

/// Owns the generalized state of one model instance and everything derived
/// from it.
///
/// A context must be exclusively owned by a single evaluation at a time;
/// parallel rollouts each clone their own.
#[derive(Debug, Clone)]
pub struct Context<T: Real> {
    pub(crate) q: DVector<T>,
    pub(crate) v: DVector<T>,
    /// Per-context body inertia, seeded from the model and overridable
    /// without touching the shared topology.
    pub(crate) body_inertia: Vec<SpatialInertia<T>>,
    pub(crate) versions: Versions,
    pub(crate) position: PositionCache<T>,
    pub(crate) velocity: VelocityCache<T>,
    pub(crate) abi: AbiCache<T>,
    pub(crate) scratch: Workspace<T>,
}

impl<T: Real> Context<T> {
    /// Allocate a default context for a finalized model: zero state, the
    /// model's body inertias, all caches empty.
    pub fn new(model: &Model<T>) -> Self {
        let n = model.num_bodies();
        Self {
            q: DVector::zeros(model.nq()),
            v: DVector::zeros(model.nv()),
            body_inertia: model.bodies().iter().map(|b| b.inertia).collect(),
            versions: Versions {
                q: 1,
                v: 1,
                params: 1,
            },
            position: PositionCache {
                x_parent: vec![SpatialTransform::identity(); n],
                x_world: vec![SpatialTransform::identity(); n],
                stamp: None,
            },
            velocity: VelocityCache {
                vel: vec![SpatialVec::zero(); n],
                vj: vec![SpatialVec::zero(); n],
                c_bias: vec![SpatialVec::zero(); n],
                stamp: None,
            },
            abi: AbiCache {
                p_art: vec![SpatialMat::zero(); n],
                u: vec![[SpatialVec::zero(); 6]; n],
                d_l: vec![Matrix6::zeros(); n],
                stamp: None,
            },
            scratch: Workspace {
                z: vec![SpatialVec::zero(); n],
                u_bias: vec![SVector::zeros(); n],
                accel: vec![SpatialVec::zero(); n],
            },
        }
    }

    /// Generalized positions.
    pub fn positions(&self) -> &DVector<T> {
        &self.q
    }

    /// Generalized velocities.
    pub fn velocities(&self) -> &DVector<T> {
        &self.v
    }

    /// Overwrite the generalized positions. Invalidates everything derived
    /// from q.
    pub fn set_positions(&mut self, q: &DVector<T>) {
        assert_eq!(q.len(), self.q.len(), "generalized position size mismatch");
        self.q.copy_from(q);
        self.versions.q += 1;
    }

    /// Overwrite the generalized velocities. Invalidates everything derived
    /// from v.
    pub fn set_velocities(&mut self, v: &DVector<T>) {
        assert_eq!(v.len(), self.v.len(), "generalized velocity size mismatch");
        self.v.copy_from(v);
        self.versions.v += 1;
    }

    /// This context's spatial inertia of a body.
    pub fn body_spatial_inertia(&self, body: BodyIndex) -> &SpatialInertia<T> {
        &self.body_inertia[body.0]
    }

    /// Override a body's spatial inertia for this context only. Invalidates
    /// the inertia-dependent caches.
    pub fn set_body_spatial_inertia(&mut self, body: BodyIndex, inertia: SpatialInertia<T>) {
        assert_ne!(body, BodyIndex::WORLD, "the world body has no inertia");
        self.body_inertia[body.0] = inertia;
        self.versions.params += 1;
    }

    /// Override a body's mass for this context only, keeping its CoM and
    /// unit-mass rotational inertia shape.
    pub fn set_body_mass(&mut self, body: BodyIndex, mass: T) {
        assert_ne!(body, BodyIndex::WORLD, "the world body has no inertia");
        let old = &self.body_inertia[body.0];
        let scale = if old.mass > <T as Real>::from_f64(0.0) {
            mass / old.mass
        } else {
            <T as Real>::from_f64(0.0)
        };
        let inertia = SpatialInertia::new(mass, old.com, old.inertia * scale);
        self.body_inertia[body.0] = inertia;
        self.versions.params += 1;
    }
}
