//! Layer values and the per-kind shape, parameter and export rules.
//!
//! A layer is a plain value: an identifier, a lock flag, its input and
//! output [`Shape`] and its kind-specific [`LayerParams`].

pub mod activation;
pub mod draft;
pub mod layer;
pub mod params;
pub mod shape;

pub use activation::Activation;
pub use draft::{LayerDraft, LayerUpdate};
pub use layer::{Layer, LayerId};
pub use params::{ConvParams, LayerKind, LayerParams, PoolParams};
pub use shape::Shape;
