//! Articulated Body Algorithm — O(n) forward dynamics.
//!
//! Given (q, v) in the context and applied forces, compute the generalized
//! accelerations without forming the mass matrix. The position-dependent
//! half of the work (articulated inertias, hinge projections and their
//! factorizations) is memoized in the context; each evaluation then runs a
//! tips-to-base bias-force pass and a base-to-tips acceleration pass over the
//! precomputed topological order.

use crate::context::Context;
use crate::kinematics::{update_position_kinematics, update_velocity_kinematics};
use crate::{ExternalForces, SingularConfigurationError};
use arbor_math::{Real, SpatialMat, SpatialVec};
use arbor_model::{BodyIndex, Model};
use nalgebra::{DVector, Matrix6, SVector, Vector3};

/// In-place Cholesky factorization of the leading `n`×`n` block of `d`.
///
/// Every pivot must exceed `tol`; returns false as soon as one does not,
/// which is the singular-hinge criterion. Comparing against a tolerance
/// proportional to the articulated inertia's largest element (rather than
/// against zero) catches hinge inertias wiped out by cancellation against a
/// disproportionately heavy neighbor while admitting arbitrarily small but
/// well-conditioned masses.
fn factorize_hinge<T: Real>(d: &mut Matrix6<T>, n: usize, tol: T) -> bool {
    for k in 0..n {
        let mut pivot = d[(k, k)];
        for j in 0..k {
            pivot -= d[(k, j)] * d[(k, j)];
        }
        // `!(pivot > tol)` also rejects NaN pivots.
        if !(pivot > tol) {
            return false;
        }
        let l_kk = pivot.sqrt();
        d[(k, k)] = l_kk;
        for r in (k + 1)..n {
            let mut sum = d[(r, k)];
            for j in 0..k {
                sum -= d[(r, j)] * d[(k, j)];
            }
            d[(r, k)] = sum / l_kk;
        }
    }
    true
}

/// Solve L·Lᵀ·x = b over the leading `n`×`n` block, in place in `b`.
fn hinge_solve<T: Real>(l: &Matrix6<T>, n: usize, b: &mut SVector<T, 6>) {
    for k in 0..n {
        let mut sum = b[k];
        for j in 0..k {
            sum -= l[(k, j)] * b[j];
        }
        b[k] = sum / l[(k, k)];
    }
    for k in (0..n).rev() {
        let mut sum = b[k];
        for j in (k + 1)..n {
            sum -= l[(j, k)] * b[j];
        }
        b[k] = sum / l[(k, k)];
    }
}

/// Bring the articulated-body inertia cache up to date with (q, params).
///
/// Tips-to-base: each body's articulated inertia is its own rigid inertia
/// plus every child's inertia with the child's joint freedoms eliminated,
/// shifted into this body's frame. The hinge inertia D = Sᵀ·P·S of every
/// jointed body is factorized here, so singular configurations surface
/// before any acceleration is computed.
pub(crate) fn update_articulated_inertia<T: Real>(
    model: &Model<T>,
    ctx: &mut Context<T>,
) -> Result<(), SingularConfigurationError> {
    update_position_kinematics(model, ctx);
    let want = (ctx.versions.q, ctx.versions.params);
    if ctx.abi.stamp == Some(want) {
        return Ok(());
    }
    ctx.abi.stamp = None;

    for i in 0..model.num_bodies() {
        ctx.abi.p_art[i] = ctx.body_inertia[i].to_matrix();
    }

    for &b in model.order().iter().rev() {
        let body = model.body(b);
        let joint = model.joint(body.parent_joint.expect("non-world body has a parent joint"));
        let nd = joint.ndof();
        let parent = joint.parent;
        let i = b.0;
        let p = ctx.abi.p_art[i];

        // Inertia this body presents to its parent once its own joint
        // freedoms are eliminated: P − U·D⁻¹·Uᵀ (P itself for a weld).
        let p_proj = if nd == 0 {
            p
        } else {
            let mut u = [SpatialVec::zero(); 6];
            let mut d = Matrix6::zeros();
            for k in 0..nd {
                u[k] = p.mul_vec(&joint.motion_subspace_col(k));
            }
            for r in 0..nd {
                for c in 0..nd {
                    d[(r, c)] = joint.motion_subspace_col(r).dot(&u[c]);
                }
            }

            let tol = T::epsilon() * p.amax();
            if !factorize_hinge(&mut d, nd, tol) {
                return Err(SingularConfigurationError { node: body.node });
            }
            ctx.abi.u[i] = u;
            ctx.abi.d_l[i] = d;

            if parent == BodyIndex::WORLD {
                p
            } else {
                let mut correction = Matrix6::zeros();
                for col in 0..6 {
                    let mut rhs = SVector::<T, 6>::zeros();
                    for k in 0..nd {
                        rhs[k] = u[k].data[col];
                    }
                    hinge_solve(&d, nd, &mut rhs);
                    for row in 0..6 {
                        let mut acc = <T as Real>::from_f64(0.0);
                        for k in 0..nd {
                            acc += u[k].data[row] * rhs[k];
                        }
                        correction[(row, col)] = acc;
                    }
                }
                SpatialMat::from_mat6(p.data - correction)
            }
        };

        if parent != BodyIndex::WORLD {
            let x_mot = ctx.position.x_parent[i].to_motion_matrix();
            let in_parent = x_mot.transpose() * p_proj.data * x_mot;
            ctx.abi.p_art[parent.0] =
                SpatialMat::from_mat6(ctx.abi.p_art[parent.0].data + in_parent);
        }
    }

    ctx.abi.stamp = Some(want);
    Ok(())
}

/// Compute the generalized accelerations for the context's (q, v) under the
/// given applied forces.
///
/// Fails with [`SingularConfigurationError`] when some hinge inertia is not
/// safely invertible; no partial result escapes. A model with zero
/// generalized coordinates yields a zero-length vector.
pub fn forward_dynamics<T: Real>(
    model: &Model<T>,
    ctx: &mut Context<T>,
    forces: &ExternalForces<T>,
) -> Result<DVector<T>, SingularConfigurationError> {
    assert_eq!(forces.tau.len(), model.nv(), "actuation size mismatch");
    assert_eq!(
        forces.body_force.len(),
        model.num_bodies(),
        "body force count mismatch"
    );

    update_velocity_kinematics(model, ctx);
    update_articulated_inertia(model, ctx)?;

    let mut vdot = DVector::zeros(model.nv());
    let Context {
        v,
        body_inertia,
        position,
        velocity,
        abi,
        scratch,
        ..
    } = ctx;

    // ── Bias seed: gyroscopic force minus the applied wrench, per body ──
    for &b in model.order() {
        let i = b.0;
        let ib = body_inertia[i].to_matrix();
        let vel = velocity.vel[i];
        scratch.z[i] = vel.cross_force(&ib.mul_vec(&vel)) - forces.body_force[i];
    }

    // ── Pass: articulated bias forces (tips → base) ──
    for &b in model.order().iter().rev() {
        let body = model.body(b);
        let joint = model.joint(body.parent_joint.expect("non-world body has a parent joint"));
        let nd = joint.ndof();
        let parent = joint.parent;
        let i = b.0;

        let mut u_b = SVector::<T, 6>::zeros();
        if nd > 0 {
            for k in 0..nd {
                let dof = joint.v_offset + k;
                let tau_k = forces.tau[dof] - joint.damping * v[dof];
                u_b[k] = tau_k - joint.motion_subspace_col(k).dot(&scratch.z[i]);
            }
            scratch.u_bias[i] = u_b;
        }

        if parent != BodyIndex::WORLD {
            // z_parent += X*⁻¹ · (z + Pᵃ·c + U·D⁻¹·u), with Pᵃ·c expanded
            // through the stored factor as P·c − U·D⁻¹·(Uᵀ·c).
            let c = velocity.c_bias[i];
            let mut g = scratch.z[i] + abi.p_art[i].mul_vec(&c);
            if nd > 0 {
                let u = &abi.u[i];
                let mut w = SVector::<T, 6>::zeros();
                for k in 0..nd {
                    w[k] = u[k].dot(&c);
                }
                hinge_solve(&abi.d_l[i], nd, &mut w);
                let mut y = u_b;
                hinge_solve(&abi.d_l[i], nd, &mut y);
                for k in 0..nd {
                    g = g + u[k] * (y[k] - w[k]);
                }
            }
            let contribution = position.x_parent[i].inv_apply_force(&g);
            scratch.z[parent.0] = scratch.z[parent.0] + contribution;
        }
    }

    // ── Pass: accelerations (base → tips) ──
    // Gravity enters as the fictitious base acceleration -g, so it never has
    // to be applied per body.
    scratch.accel[0] = SpatialVec::new(Vector3::zeros(), -forces.gravity);
    for &b in model.order() {
        let body = model.body(b);
        let joint = model.joint(body.parent_joint.expect("non-world body has a parent joint"));
        let nd = joint.ndof();
        let i = b.0;

        let a_in = position.x_parent[i].apply_motion(&scratch.accel[joint.parent.0])
            + velocity.c_bias[i];
        if nd == 0 {
            scratch.accel[i] = a_in;
            continue;
        }

        let u = &abi.u[i];
        let mut qdd = SVector::<T, 6>::zeros();
        for k in 0..nd {
            qdd[k] = scratch.u_bias[i][k] - u[k].dot(&a_in);
        }
        hinge_solve(&abi.d_l[i], nd, &mut qdd);

        let mut a = a_in;
        for k in 0..nd {
            vdot[joint.v_offset + k] = qdd[k];
            a = a + joint.motion_subspace_col(k) * qdd[k];
        }
        scratch.accel[i] = a;
    }

    Ok(vdot)
}
