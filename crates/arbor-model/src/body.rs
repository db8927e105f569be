//! Rigid body definition.

use crate::JointIndex;
use arbor_math::{Real, SpatialInertia};

/// Index of a body in the model's arena. The world is always index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyIndex(pub usize);

impl BodyIndex {
    /// The world body.
    pub const WORLD: BodyIndex = BodyIndex(0);
}

impl std::fmt::Display for BodyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rigid body in the kinematic tree.
#[derive(Debug, Clone)]
pub struct Body<T: Real> {
    /// Name of the body (for diagnostics).
    pub name: String,
    /// Default spatial inertia in body-local frame. A context may override it
    /// per instance without touching the model.
    pub inertia: SpatialInertia<T>,
    /// The joint connecting this body to its parent; `None` only for world.
    pub parent_joint: Option<JointIndex>,
    /// Position in the finalized topological order (world = 0). Diagnostics
    /// report this node index.
    pub node: usize,
}
