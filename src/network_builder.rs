//! NetworkBuilder - fluent construction of a whole layer graph.
//!
//! Mirrors the way a network is usually written down: start from the input
//! shape and chain layers in order. Shapes are inferred as layers are added.

use crate::errors::{GraphError, Result};
use crate::graph::{LayerGraph, ParameterLimits};
use crate::layers::{Activation, ConvParams, Layer, LayerParams, PoolParams, Shape};

/// Configuration for building a LayerGraph.
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    /// Shape fed into the input layer.
    pub input_shape: Shape,
    /// Layer parameters after the input layer, with their lock flags.
    pub layer_configs: Vec<(LayerParams, bool)>,
    /// Limits handed to the built graph.
    pub limits: ParameterLimits,
}

impl NetworkBuilder {
    /// Starts a network whose input layer produces `input_shape`.
    pub fn new(input_shape: Shape) -> Self {
        Self {
            input_shape,
            layer_configs: Vec::new(),
            limits: ParameterLimits::default(),
        }
    }

    /// Starts a network over `[channels, height, width]` images.
    pub fn with_image_input(channels: usize, height: usize, width: usize) -> Result<Self> {
        Ok(Self::new(Shape::image(channels, height, width)?))
    }

    /// Adds a layer with explicit parameters.
    ///
    /// The input layer is created from the input shape, so
    /// [`LayerParams::Input`] here makes [`build`](Self::build) fail.
    pub fn layer(mut self, params: LayerParams) -> Self {
        self.layer_configs.push((params, false));
        self
    }

    /// Adds a convolution layer.
    pub fn conv(self, filters: usize, kernel_size: usize, stride: usize, padding: usize) -> Self {
        self.layer(LayerParams::Convolution(ConvParams {
            filters,
            kernel_size,
            stride,
            padding,
        }))
    }

    /// Adds a max pooling layer.
    pub fn max_pool(self, pool_size: usize, stride: usize) -> Self {
        self.layer(LayerParams::MaxPool(PoolParams { pool_size, stride }))
    }

    /// Adds a linear layer.
    pub fn linear(self, units: usize) -> Self {
        self.layer(LayerParams::Linear { units })
    }

    /// Adds an activation layer.
    pub fn activation(self, activation: Activation) -> Self {
        self.layer(LayerParams::Activation(activation))
    }

    /// Adds a flatten layer.
    pub fn flatten(self) -> Self {
        self.layer(LayerParams::Flatten)
    }

    /// Adds a batch normalization layer.
    pub fn batch_norm(self) -> Self {
        self.layer(LayerParams::BatchNorm)
    }

    /// Locks the most recently added layer.
    pub fn locked(mut self) -> Self {
        if let Some((_, locked)) = self.layer_configs.last_mut() {
            *locked = true;
        }
        self
    }

    /// Sets the limits the built graph validates updates against.
    pub fn limits(mut self, limits: ParameterLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Builds the graph, inferring every shape from the input forward.
    pub fn build(&self) -> Result<LayerGraph> {
        if self.layer_configs.is_empty() {
            return Err(GraphError::TooFewLayers { count: 1 });
        }

        let mut layers = vec![Layer::input(self.input_shape.clone())];
        for (params, locked) in &self.layer_configs {
            if matches!(params, LayerParams::Input) {
                return Err(GraphError::invalid_parameter(
                    "an input layer can only start a network",
                ));
            }
            self.limits.check(params)?;
            let input = layers[layers.len() - 1].output_shape().clone();
            layers.push(Layer::new(params.clone(), input)?.locked(*locked)?);
        }

        log::debug!("built network with {} layers", layers.len());
        Ok(LayerGraph::new(layers)?.with_limits(self.limits.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::LayerKind;

    #[test]
    fn test_builder_creation() {
        let builder = NetworkBuilder::with_image_input(1, 28, 28)
            .unwrap()
            .conv(8, 3, 1, 1)
            .activation(Activation::Relu)
            .linear(10)
            .locked();

        assert_eq!(builder.layer_configs.len(), 3);
        assert!(builder.layer_configs[2].1);
        assert!(!builder.layer_configs[0].1);
    }

    #[test]
    fn test_builder_build() {
        let graph = NetworkBuilder::with_image_input(1, 28, 28)
            .unwrap()
            .conv(8, 3, 1, 1)
            .activation(Activation::Relu)
            .max_pool(2, 2)
            .flatten()
            .linear(10)
            .locked()
            .build()
            .expect("Failed to build network");

        assert_eq!(graph.len(), 6);
        assert_eq!(graph.first().kind(), LayerKind::Input);
        assert_eq!(graph.layers()[3].output_shape().dims(), &[8, 14, 14]);
        assert_eq!(graph.layers()[4].output_shape().dims(), &[1568]);
        assert_eq!(graph.last().output_shape().dims(), &[10]);
        assert!(graph.last().is_locked());
        // conv 8*1*9+8, linear 1568*10+10
        assert_eq!(graph.total_parameters(), 80 + 15690);
    }

    #[test]
    fn test_builder_no_layers_error() {
        let result = NetworkBuilder::with_image_input(3, 8, 8).unwrap().build();
        assert!(matches!(result, Err(GraphError::TooFewLayers { count: 1 })));
    }

    #[test]
    fn test_builder_checks_limits() {
        let result = NetworkBuilder::new(Shape::features(4).unwrap())
            .linear(4096)
            .build();
        assert!(matches!(
            result,
            Err(GraphError::ParameterOutOfRange { name: "units", .. })
        ));

        let graph = NetworkBuilder::new(Shape::features(4).unwrap())
            .limits(ParameterLimits::unbounded())
            .linear(4096)
            .build()
            .unwrap();
        assert_eq!(graph.last().output_shape().dims(), &[4096]);
    }

    #[test]
    fn test_builder_rejects_extra_input_layer() {
        let result = NetworkBuilder::new(Shape::features(16).unwrap())
            .layer(LayerParams::Input)
            .linear(4)
            .build();
        match result {
            Err(GraphError::InvalidParameter { message }) => {
                assert_eq!(message, "an input layer can only start a network")
            }
            other => panic!("expected an invalid parameter error, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_rejects_shape_errors() {
        let result = NetworkBuilder::new(Shape::features(16).unwrap())
            .max_pool(2, 2)
            .build();
        assert!(matches!(result, Err(GraphError::InvalidShape { .. })));
    }
}
