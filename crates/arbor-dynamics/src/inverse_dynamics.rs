//! Recursive Newton-Euler inverse dynamics.
//!
//! Given (q, v) in the context and desired accelerations, compute the
//! generalized forces required to produce them. This is the building block
//! of the mass-matrix verification oracle; unlike the ABA path it allocates
//! its per-body scratch on every call.

use crate::kinematics::update_velocity_kinematics;
use crate::{Context, ExternalForces};
use arbor_math::{Real, SpatialVec};
use arbor_model::{BodyIndex, Model};
use nalgebra::{DVector, Vector3};

/// Compute the generalized forces that would sustain `vdot` at the context's
/// (q, v) under the given gravity and body wrenches. Joint damping is a force
/// element, not part of the rigid-body dynamics, so it is not included here.
pub fn inverse_dynamics<T: Real>(
    model: &Model<T>,
    ctx: &mut Context<T>,
    vdot: &DVector<T>,
    forces: &ExternalForces<T>,
) -> DVector<T> {
    assert_eq!(vdot.len(), model.nv(), "acceleration size mismatch");
    update_velocity_kinematics(model, ctx);

    let n = model.num_bodies();
    let mut acc = vec![SpatialVec::zero(); n];
    let mut f = vec![SpatialVec::zero(); n];
    let mut tau = DVector::zeros(model.nv());

    // ── Forward pass: spatial accelerations and body forces ──
    acc[0] = SpatialVec::new(Vector3::zeros(), -forces.gravity);
    for &b in model.order() {
        let body = model.body(b);
        let joint = model.joint(body.parent_joint.expect("non-world body has a parent joint"));
        let i = b.0;

        let mut a = ctx.position.x_parent[i].apply_motion(&acc[joint.parent.0])
            + ctx.velocity.c_bias[i];
        for k in 0..joint.ndof() {
            a = a + joint.motion_subspace_col(k) * vdot[joint.v_offset + k];
        }
        acc[i] = a;

        let ib = ctx.body_inertia[i].to_matrix();
        let vel = ctx.velocity.vel[i];
        f[i] = ib.mul_vec(&a) + vel.cross_force(&ib.mul_vec(&vel)) - forces.body_force[i];
    }

    // ── Backward pass: project onto the joints, accumulate up the tree ──
    for &b in model.order().iter().rev() {
        let body = model.body(b);
        let joint = model.joint(body.parent_joint.expect("non-world body has a parent joint"));
        let i = b.0;

        for k in 0..joint.ndof() {
            tau[joint.v_offset + k] = joint.motion_subspace_col(k).dot(&f[i]);
        }
        if joint.parent != BodyIndex::WORLD {
            f[joint.parent.0] =
                f[joint.parent.0] + ctx.position.x_parent[i].inv_apply_force(&f[i]);
        }
    }

    tau
}
