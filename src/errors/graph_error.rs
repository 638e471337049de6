//! Layer-graph error types.

use thiserror::Error;

/// Errors that can occur while building or editing a layer graph.
///
/// A mutation that fails with any of these leaves the graph exactly as it
/// was before the call.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Layer at index {index} is a boundary layer and cannot be moved or removed")]
    BoundaryLayerProtected { index: usize },

    #[error("Layer not found: {id}")]
    LayerNotFound { id: String },

    #[error("Layer {id} appears more than once")]
    DuplicateLayerId { id: String },

    #[error("Index {index} is out of range for a graph of {len} layers")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid shape: {message}")]
    InvalidShape { message: String },

    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("Parameter {name} = {value} is outside the allowed range {min}..={max}")]
    ParameterOutOfRange {
        name: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },

    #[error("Kind mismatch: expected {expected} parameters, got {actual}")]
    KindMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("A graph needs at least two layers, got {count}")]
    TooFewLayers { count: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GraphError {
    pub(crate) fn invalid_shape(message: impl Into<String>) -> Self {
        Self::InvalidShape {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Returns true for rejections of a well-formed request that the graph
    /// refuses by convention (as opposed to malformed input).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::BoundaryLayerProtected { .. } | Self::LayerNotFound { .. }
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GraphError>;
