//! The layer graph and its shape propagation engine.
//!
//! # Example
//!
//! ```
//! use netbuilder::graph::LayerGraph;
//! use netbuilder::layers::{LayerKind, Shape};
//!
//! let mut graph = LayerGraph::default();
//! let conv = graph.push_layer(LayerKind::Convolution).unwrap();
//!
//! // edits go through a draft and take effect on commit
//! let mut draft = graph.draft(conv).unwrap();
//! draft.set_filters(16).unwrap();
//! graph.commit(draft).unwrap();
//!
//! assert_eq!(graph.last().input_shape(), &Shape::image(16, 224, 224).unwrap());
//! ```

mod core;
mod limits;
mod propagate;

pub use self::core::LayerGraph;
pub use limits::ParameterLimits;
pub use propagate::{find_discontinuity, propagate};
