//! Applied-forces description for one dynamics evaluation.

use arbor_math::{Real, SpatialVec};
use arbor_model::{BodyIndex, Model};
use nalgebra::{DVector, Vector3};

/// Forces acting on the mechanism at the current instant.
#[derive(Debug, Clone)]
pub struct ExternalForces<T: Real> {
    /// Gravity acting on every body, expressed in the world frame.
    pub gravity: Vector3<T>,
    /// Generalized actuation forces/torques, one per velocity DOF.
    pub tau: DVector<T>,
    /// Spatial wrench applied to each body, expressed in that body's frame.
    /// Entry 0 (world) is ignored.
    pub body_force: Vec<SpatialVec<T>>,
}

impl<T: Real> ExternalForces<T> {
    /// No actuation, no wrenches, the model's default gravity.
    pub fn new(model: &Model<T>) -> Self {
        Self {
            gravity: model.gravity(),
            tau: DVector::zeros(model.nv()),
            body_force: vec![SpatialVec::zero(); model.num_bodies()],
        }
    }

    /// Everything zero, gravity included. Used by the mass-matrix oracle.
    pub fn zero(model: &Model<T>) -> Self {
        Self {
            gravity: Vector3::zeros(),
            ..Self::new(model)
        }
    }

    /// Accumulate a spatial wrench onto a body (body frame).
    pub fn add_body_force(&mut self, body: BodyIndex, wrench: SpatialVec<T>) {
        self.body_force[body.0] = self.body_force[body.0] + wrench;
    }
}
