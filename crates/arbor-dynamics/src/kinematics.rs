//! Position and velocity kinematics, computed top-down over the tree and
//! memoized in the context.

use crate::Context;
use arbor_math::{Real, SpatialTransform, SpatialVec};
use arbor_model::{BodyIndex, Model};

/// Bring the position cache up to date with the context's q.
pub(crate) fn update_position_kinematics<T: Real>(model: &Model<T>, ctx: &mut Context<T>) {
    if ctx.position.stamp == Some(ctx.versions.q) {
        return;
    }
    for &b in model.order() {
        let body = model.body(b);
        let joint = model.joint(body.parent_joint.expect("non-world body has a parent joint"));
        let q = &ctx.q.as_slice()[joint.q_offset..joint.q_offset + joint.ndof()];

        let x_joint = joint.joint_transform(q);
        let x_parent = x_joint.compose(&joint.x_parent_joint);
        let x_world = x_parent.compose(&ctx.position.x_world[joint.parent.0]);

        ctx.position.x_parent[b.0] = x_parent;
        ctx.position.x_world[b.0] = x_world;
    }
    ctx.position.stamp = Some(ctx.versions.q);
}

/// Bring the velocity cache up to date with the context's (q, v).
pub(crate) fn update_velocity_kinematics<T: Real>(model: &Model<T>, ctx: &mut Context<T>) {
    update_position_kinematics(model, ctx);
    if ctx.velocity.stamp == Some((ctx.versions.q, ctx.versions.v)) {
        return;
    }
    for &b in model.order() {
        let body = model.body(b);
        let joint = model.joint(body.parent_joint.expect("non-world body has a parent joint"));
        let qd = &ctx.v.as_slice()[joint.v_offset..joint.v_offset + joint.ndof()];

        let vj = joint.joint_velocity(qd);
        let v_parent = ctx.position.x_parent[b.0].apply_motion(&ctx.velocity.vel[joint.parent.0]);
        let vel = v_parent + vj;

        ctx.velocity.vj[b.0] = vj;
        ctx.velocity.vel[b.0] = vel;
        ctx.velocity.c_bias[b.0] = vel.cross_motion(&vj);
    }
    ctx.velocity.stamp = Some((ctx.versions.q, ctx.versions.v));
}

/// Plücker transform from the world frame to the body frame, for the
/// context's current positions. `pos` is the body origin expressed in world.
pub fn body_pose_in_world<T: Real>(
    model: &Model<T>,
    ctx: &mut Context<T>,
    body: BodyIndex,
) -> SpatialTransform<T> {
    update_position_kinematics(model, ctx);
    ctx.position.x_world[body.0]
}

/// Spatial velocity of a body in its own frame, for the context's current
/// positions and velocities.
pub fn body_spatial_velocity<T: Real>(
    model: &Model<T>,
    ctx: &mut Context<T>,
    body: BodyIndex,
) -> SpatialVec<T> {
    update_velocity_kinematics(model, ctx);
    ctx.velocity.vel[body.0]
}
