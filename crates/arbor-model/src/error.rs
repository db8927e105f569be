//! Error types for model construction.

use arbor_math::InvalidArgumentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model is already finalized")]
    AlreadyFinalized,

    #[error("unknown body index {0}")]
    UnknownBody(usize),

    #[error("unknown joint index {0}")]
    UnknownJoint(usize),

    #[error("the world body cannot be the child of a joint")]
    WorldCannotBeChild,

    #[error("body {0} already has a parent joint")]
    DuplicateParentJoint(usize),

    #[error("body {0} is not connected to the world by any chain of joints")]
    DisconnectedBody(usize),

    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgumentError),
}

pub type Result<T> = std::result::Result<T, ModelError>;
