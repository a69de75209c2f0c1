use crate::{camera::ProjectionKind, graph::BuiltinType};

/// Convenience result type used across the crate.
pub type EdlResult<T> = Result<T, EdlError>;

/// Top-level error taxonomy for kernel generation, shading and graph evaluation.
#[derive(thiserror::Error, Debug)]
pub enum EdlError {
    /// Kernel generation was requested with a type this crate does not know.
    #[error("unsupported kernel type: {0}")]
    UnsupportedKernelType(String),

    /// The camera projection has no depth linearization.
    #[error("unsupported projection: {0} cameras have no depth linearization")]
    UnsupportedProjection(ProjectionKind),

    /// Kernel sizes must be positive integers within the shader array limit.
    #[error("invalid kernel size: {0}")]
    InvalidKernelSize(f64),

    /// A disposed pass was used again.
    #[error("use after dispose: {0}")]
    UseAfterDispose(&'static str),

    /// A dependency's declared type does not match the consuming slot.
    #[error("graph type mismatch on `{node}.{slot}`: expected {expected}, found {found}")]
    GraphTypeMismatch {
        /// Consuming node name.
        node: String,
        /// Consuming slot name.
        slot: String,
        /// Type declared by the slot.
        expected: BuiltinType,
        /// Type produced by the dependency.
        found: BuiltinType,
    },

    /// Structural graph errors (unknown nodes or outputs, cycles).
    #[error("graph error: {0}")]
    Graph(String),

    /// Invalid user-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while executing a pass or evaluating a node.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EdlError {
    /// Build an [`EdlError::Graph`] value.
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph(msg.into())
    }

    /// Build an [`EdlError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`EdlError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build an [`EdlError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
