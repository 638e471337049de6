//! A single layer in the graph: identity, lock state, shapes and parameters.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use super::params::{LayerKind, LayerParams};
use super::shape::Shape;
use crate::errors::{GraphError, Result};

/// Stable identifier of a layer, generated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LayerId(Uuid);

impl LayerId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A layer value.
///
/// The output shape of an unlocked layer is always derived from its input
/// shape and parameters. A locked layer keeps whatever output shape it had
/// when it was locked. Input layers are always locked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layer {
    id: LayerId,
    locked: bool,
    input_shape: Shape,
    output_shape: Shape,
    params: LayerParams,
}

impl Layer {
    /// Creates an unlocked layer fed by `input_shape`.
    ///
    /// The output shape is computed from the parameters right away.
    pub fn new(params: LayerParams, input_shape: Shape) -> Result<Self> {
        let locked = matches!(params, LayerParams::Input);
        let output_shape = params.output_shape(&input_shape)?;
        Ok(Self {
            id: LayerId::generate(),
            locked,
            input_shape,
            output_shape,
            params,
        })
    }

    /// Creates a layer of `kind` with that kind's default parameters.
    pub fn with_defaults(kind: LayerKind, input_shape: Shape) -> Result<Self> {
        let params = kind.default_params(&input_shape);
        Self::new(params, input_shape)
    }

    /// Creates the network input layer.
    pub fn input(shape: Shape) -> Self {
        Self {
            id: LayerId::generate(),
            locked: true,
            output_shape: shape.clone(),
            input_shape: shape,
            params: LayerParams::Input,
        }
    }

    /// Returns this layer locked (or unlocked) at its current output shape.
    pub fn locked(mut self, locked: bool) -> Result<Self> {
        self.set_locked(locked)?;
        Ok(self)
    }

    /// Returns the unique id of this layer.
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Returns the kind of this layer.
    pub fn kind(&self) -> LayerKind {
        self.params.kind()
    }

    /// Returns true when the output shape is pinned.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Returns the shape fed into this layer.
    pub fn input_shape(&self) -> &Shape {
        &self.input_shape
    }

    /// Returns the shape this layer produces.
    pub fn output_shape(&self) -> &Shape {
        &self.output_shape
    }

    /// Returns the kind-specific parameters.
    pub fn params(&self) -> &LayerParams {
        &self.params
    }

    /// Counts the trainable parameters of this layer.
    pub fn parameter_count(&self) -> u64 {
        self.params.parameter_count(&self.input_shape)
    }

    /// Renders this layer as a PyTorch module expression.
    pub fn module_text(&self, alias: &str) -> String {
        self.params.module_text(&self.input_shape, alias)
    }

    /// Feeds a new input shape; unlocked layers recompute their output.
    pub(crate) fn set_input_shape(&mut self, input_shape: Shape) -> Result<()> {
        if !self.locked {
            self.output_shape = self.params.output_shape(&input_shape)?;
        }
        self.input_shape = input_shape;
        Ok(())
    }

    /// Replaces the parameters. The kind must not change.
    pub(crate) fn set_params(&mut self, params: LayerParams) -> Result<()> {
        if params.kind() != self.kind() {
            return Err(GraphError::KindMismatch {
                expected: self.kind().name(),
                actual: params.kind().name(),
            });
        }
        self.params = params;
        Ok(())
    }

    /// Sets the lock flag. Input layers cannot be unlocked.
    pub(crate) fn set_locked(&mut self, locked: bool) -> Result<()> {
        if !locked && self.kind() == LayerKind::Input {
            return Err(GraphError::invalid_parameter("input layers are always locked"));
        }
        self.locked = locked;
        Ok(())
    }

    /// Re-derives the output shape of an unlocked layer from its own input.
    pub(crate) fn recompute_output(&mut self) -> Result<()> {
        if !self.locked {
            self.output_shape = self.params.output_shape(&self.input_shape)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::params::ConvParams;

    #[test]
    fn test_new_layer_derives_output() {
        let layer = Layer::new(
            LayerParams::Linear { units: 10 },
            Shape::features(64).unwrap(),
        )
        .unwrap();
        assert!(!layer.is_locked());
        assert_eq!(layer.output_shape().dims(), &[10]);
        assert_eq!(layer.parameter_count(), 650);
        assert_eq!(layer.kind(), LayerKind::Linear);
    }

    #[test]
    fn test_layer_ids_are_unique() {
        let shape = Shape::features(4).unwrap();
        let a = Layer::with_defaults(LayerKind::Flatten, shape.clone()).unwrap();
        let b = Layer::with_defaults(LayerKind::Flatten, shape).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_input_layer_is_always_locked() {
        let mut input = Layer::input(Shape::image(1, 28, 28).unwrap());
        assert!(input.is_locked());
        assert!(input.set_locked(false).is_err());
        assert!(input.is_locked());

        let via_new = Layer::new(LayerParams::Input, Shape::features(3).unwrap()).unwrap();
        assert!(via_new.is_locked());
    }

    #[test]
    fn test_locked_layer_keeps_output_on_new_input() {
        let mut layer = Layer::new(
            LayerParams::Convolution(ConvParams {
                filters: 8,
                ..ConvParams::default()
            }),
            Shape::image(3, 32, 32).unwrap(),
        )
        .unwrap()
        .locked(true)
        .unwrap();

        layer
            .set_input_shape(Shape::image(3, 16, 16).unwrap())
            .unwrap();
        assert_eq!(layer.input_shape().dims(), &[3, 16, 16]);
        assert_eq!(layer.output_shape().dims(), &[8, 32, 32]);
    }

    #[test]
    fn test_set_params_rejects_other_kind() {
        let mut layer =
            Layer::with_defaults(LayerKind::MaxPool, Shape::image(3, 8, 8).unwrap()).unwrap();
        let err = layer
            .set_params(LayerParams::Linear { units: 4 })
            .unwrap_err();
        assert!(matches!(
            err,
            GraphError::KindMismatch {
                expected: "maxpool",
                actual: "linear"
            }
        ));
    }

    #[test]
    fn test_failed_input_update_leaves_layer_untouched() {
        let mut layer = Layer::new(
            LayerParams::Convolution(ConvParams {
                filters: 4,
                kernel_size: 5,
                stride: 1,
                padding: 0,
            }),
            Shape::image(1, 8, 8).unwrap(),
        )
        .unwrap();
        let before = layer.clone();
        assert!(layer
            .set_input_shape(Shape::image(1, 2, 2).unwrap())
            .is_err());
        assert_eq!(layer, before);
    }
}
