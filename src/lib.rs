//! # netbuilder
//!
//! A Rust library for assembling sequential neural network architectures,
//! keeping every layer's tensor shape consistent while the sequence is edited,
//! and exporting the result as PyTorch source.
//!
//! ## Features
//!
//! - **Typed layers**: input, convolution, max pooling, linear, activation,
//!   flatten and batch normalization, each with its own shape rule and
//!   parameter count.
//! - **Shape propagation**: every insert, delete, reorder or parameter edit
//!   re-derives shapes downstream of the change. Locked layers keep their
//!   output shape.
//! - **Transactional edits**: a rejected mutation leaves the graph as it was.
//! - **PyTorch export**: the graph renders as an `nn.Sequential` definition.
//!
//! ## Example
//!
//! ```
//! use netbuilder::prelude::*;
//!
//! let mut graph = NetworkBuilder::with_image_input(3, 32, 32)
//!     .unwrap()
//!     .conv(16, 3, 1, 1)
//!     .activation(Activation::Relu)
//!     .flatten()
//!     .linear(10)
//!     .locked()
//!     .build()
//!     .expect("Failed to build network");
//!
//! // halve the spatial size before flattening
//! graph.insert(LayerKind::MaxPool, 3).unwrap();
//! assert_eq!(graph.layers()[4].output_shape().dims(), &[16 * 16 * 16]);
//!
//! let code = graph.emit_module_text();
//! assert!(code.contains("nn.MaxPool2d(kernel_size=2, stride=2)"));
//! assert!(code.contains("nn.Linear(4096, 10)"));
//! ```

pub mod errors;
pub mod export;
pub mod graph;
pub mod layers;
pub mod network_builder;

// Re-exports for convenience
pub use errors::{GraphError, Result};
pub use graph::LayerGraph;
pub use layers::{Activation, Layer, LayerKind, LayerParams, Shape};
pub use network_builder::NetworkBuilder;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::errors::{GraphError, Result};
    pub use crate::export::{ExportConfig, GraphSummary, emit};
    pub use crate::graph::{LayerGraph, ParameterLimits};
    pub use crate::layers::{
        Activation, ConvParams, Layer, LayerDraft, LayerId, LayerKind, LayerParams, LayerUpdate,
        PoolParams, Shape,
    };
    pub use crate::network_builder::NetworkBuilder;
}
