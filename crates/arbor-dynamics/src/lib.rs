//! Forward dynamics of articulated rigid-body trees.
//!
//! The production path is the O(n) Articulated Body Algorithm over a
//! finalized [`arbor_model::Model`]: position and velocity kinematics and the
//! articulated-body inertias are memoized per [`Context`] against version
//! counters of the generalized state, and [`forward_dynamics`] resolves the
//! generalized accelerations for a set of applied forces.
//!
//! The mass-matrix path ([`mass_matrix`],
//! [`forward_dynamics_via_mass_matrix`]) is an O(n²) reference used to
//! cross-check the ABA result; it is not meant for per-step evaluation.

mod aba;
mod context;
mod energy;
mod error;
mod forces;
mod inverse_dynamics;
mod kinematics;
mod mass_matrix;

pub use aba::forward_dynamics;
pub use context::Context;
pub use energy::{kinetic_energy, potential_energy, total_energy};
pub use error::SingularConfigurationError;
pub use forces::ExternalForces;
pub use inverse_dynamics::inverse_dynamics;
pub use kinematics::{body_pose_in_world, body_spatial_velocity};
pub use mass_matrix::{forward_dynamics_via_mass_matrix, mass_matrix};
