//! Mass-matrix reference path, used to cross-check the ABA engine.
//!
//! M(q) is assembled one inverse-dynamics evaluation per velocity DOF (unit
//! acceleration, zero velocity, zero gravity) and the bias term comes from
//! one inverse-dynamics evaluation at zero acceleration. This is O(n²) and
//! exists only as a verification oracle; the production forward-dynamics
//! path is [`crate::forward_dynamics`].

use crate::{inverse_dynamics, Context, ExternalForces};
use arbor_math::Real;
use arbor_model::Model;
use nalgebra::{Cholesky, DMatrix, DVector};

/// The joint-space mass matrix M(q) at the context's current positions,
/// via repeated inverse dynamics. Symmetric positive-definite for any model
/// whose bodies carry inertia along all motion directions.
pub fn mass_matrix<T: Real>(model: &Model<T>, ctx: &Context<T>) -> DMatrix<T> {
    let nv = model.nv();
    let mut m = DMatrix::zeros(nv, nv);

    // Work on a private copy at the same q so the caller's velocity state and
    // caches are untouched.
    let mut scratch = ctx.clone();
    scratch.set_velocities(&DVector::zeros(nv));
    let no_forces = ExternalForces::zero(model);

    let mut vdot = DVector::zeros(nv);
    for j in 0..nv {
        vdot[j] = <T as Real>::from_f64(1.0);
        let col = inverse_dynamics(model, &mut scratch, &vdot, &no_forces);
        m.column_mut(j).copy_from(&col);
        vdot[j] = <T as Real>::from_f64(0.0);
    }
    m
}

/// Reference forward dynamics: solve `M(q)·v̇ = τ_applied − damping∘v − bias`
/// directly by Cholesky, the bias being inverse dynamics at zero
/// acceleration. Returns `None` when M is not positive definite.
pub fn forward_dynamics_via_mass_matrix<T: Real>(
    model: &Model<T>,
    ctx: &mut Context<T>,
    forces: &ExternalForces<T>,
) -> Option<DVector<T>> {
    let nv = model.nv();
    let m = mass_matrix(model, ctx);

    let bias = inverse_dynamics(model, ctx, &DVector::zeros(nv), forces);
    let mut rhs = &forces.tau - &bias;
    for joint in model.joints() {
        for k in 0..joint.ndof() {
            let dof = joint.v_offset + k;
            rhs[dof] = rhs[dof] - joint.damping * ctx.velocities()[dof];
        }
    }

    Cholesky::new(m).map(|chol| chol.solve(&rhs))
}
