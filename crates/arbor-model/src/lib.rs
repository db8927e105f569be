//! Kinematic tree model — the static description of an articulated mechanism.
//!
//! A model is built with [`ModelBuilder`] by adding bodies and the joints
//! that connect them, then sealed with [`ModelBuilder::finalize`]. The
//! finalized [`Model`] is immutable and can be shared read-only across any
//! number of concurrent evaluations.

mod body;
mod error;
mod joint;
mod model;

pub use body::{Body, BodyIndex};
pub use error::{ModelError, Result};
pub use joint::{Joint, JointIndex, JointKind};
pub use model::{Model, ModelBuilder};
