//! Mechanical energy queries.

use crate::kinematics::{update_position_kinematics, update_velocity_kinematics};
use crate::Context;
use arbor_math::Real;
use arbor_model::Model;

/// Kinetic energy: Σ ½ vᵢᵀ Iᵢ vᵢ over the bodies, via the velocity cache.
pub fn kinetic_energy<T: Real>(model: &Model<T>, ctx: &mut Context<T>) -> T {
    update_velocity_kinematics(model, ctx);
    let mut ke = <T as Real>::from_f64(0.0);
    for &b in model.order() {
        let i = b.0;
        let ib = ctx.body_inertia[i].to_matrix();
        let vel = ctx.velocity.vel[i];
        ke += vel.dot(&ib.mul_vec(&vel)) * <T as Real>::from_f64(0.5);
    }
    ke
}

/// Gravitational potential energy −Σ mᵢ g·comᵢ under the model's default
/// gravity, via the position cache.
pub fn potential_energy<T: Real>(model: &Model<T>, ctx: &mut Context<T>) -> T {
    update_position_kinematics(model, ctx);
    let g = model.gravity();
    let mut pe = <T as Real>::from_f64(0.0);
    for &b in model.order() {
        let i = b.0;
        let si = ctx.body_inertia[i];
        let xf = &ctx.position.x_world[i];
        let com_world = xf.rot.transpose() * si.com + xf.pos;
        pe -= si.mass * g.dot(&com_world);
    }
    pe
}

/// Total mechanical energy (kinetic + potential).
pub fn total_energy<T: Real>(model: &Model<T>, ctx: &mut Context<T>) -> T {
    kinetic_energy(model, ctx) + potential_energy(model, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use arbor_math::{SpatialInertia, SpatialTransform, STANDARD_GRAVITY};
    use arbor_model::{BodyIndex, JointKind, ModelBuilder};
    use nalgebra::{DVector, Matrix3, Vector3};

    type Vec3 = Vector3<f64>;

    fn pendulum() -> Model<f64> {
        let i = 1.0 / 12.0;
        let mut builder = ModelBuilder::new();
        builder.gravity(Vec3::new(0.0, -STANDARD_GRAVITY, 0.0));
        let link = builder
            .add_body(
                "link",
                SpatialInertia::new(
                    1.0,
                    Vec3::new(0.0, -0.5, 0.0),
                    Matrix3::from_diagonal(&Vec3::new(i, 0.0, i)),
                ),
            )
            .unwrap();
        builder
            .add_joint(
                "hinge",
                BodyIndex::WORLD,
                link,
                JointKind::Revolute,
                SpatialTransform::identity(),
                None,
            )
            .unwrap();
        builder.finalize().unwrap()
    }

    #[test]
    fn pendulum_energy_against_closed_forms() {
        let model = pendulum();
        let mut ctx = Context::new(&model);

        // Hanging at rest: KE = 0, PE = -m g L/2.
        assert_relative_eq!(kinetic_energy(&model, &mut ctx), 0.0, epsilon = 1e-14);
        assert_relative_eq!(
            potential_energy(&model, &mut ctx),
            -STANDARD_GRAVITY * 0.5,
            epsilon = 1e-12
        );

        // Horizontal: CoM at height 0, spinning at ω: KE = ½ (mL²/3) ω².
        ctx.set_positions(&DVector::from_vec(vec![std::f64::consts::FRAC_PI_2]));
        ctx.set_velocities(&DVector::from_vec(vec![2.0]));
        assert_relative_eq!(potential_energy(&model, &mut ctx), 0.0, epsilon = 1e-12);
        assert_relative_eq!(
            kinetic_energy(&model, &mut ctx),
            0.5 * (1.0 / 3.0) * 4.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            total_energy(&model, &mut ctx),
            kinetic_energy(&model, &mut ctx) + potential_energy(&model, &mut ctx),
            epsilon = 1e-12
        );
    }
}
