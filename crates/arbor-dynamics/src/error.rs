//! Error types for dynamics evaluation.

use thiserror::Error;

/// The articulated body hinge inertia of some joint could not be inverted.
///
/// Raised from within forward-dynamics evaluation when a body has (near-)zero
/// inertia along a direction its joint permits motion in, possibly amplified
/// by a disproportionately heavy neighbor. Recoverable by adjusting model
/// parameters; the current evaluation produces no accelerations.
#[derive(Debug, Clone, Error)]
#[error(
    "encountered singular articulated body hinge inertia for body node index \
     {node}. Ensure that this body has non-zero inertia along all axes of \
     permitted motion."
)]
pub struct SingularConfigurationError {
    /// Topological node index of the offending body (world = 0).
    pub node: usize,
}
