//! Kind-specific layer parameters and the rules attached to each kind.
//!
//! Every capability (shape inference, parameter count, module text) is a
//! single exhaustive `match` over [`LayerParams`].

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::activation::Activation;
use super::shape::Shape;
use crate::errors::{GraphError, Result};

/// The kind of a layer, without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Input,
    Convolution,
    MaxPool,
    Linear,
    Activation,
    Flatten,
    BatchNorm,
}

impl LayerKind {
    /// All kinds, in menu order.
    pub const ALL: [LayerKind; 7] = [
        LayerKind::Input,
        LayerKind::Convolution,
        LayerKind::MaxPool,
        LayerKind::Linear,
        LayerKind::Activation,
        LayerKind::Flatten,
        LayerKind::BatchNorm,
    ];

    /// Returns the lowercase kind name.
    pub fn name(&self) -> &'static str {
        match self {
            LayerKind::Input => "input",
            LayerKind::Convolution => "convolution",
            LayerKind::MaxPool => "maxpool",
            LayerKind::Linear => "linear",
            LayerKind::Activation => "activation",
            LayerKind::Flatten => "flatten",
            LayerKind::BatchNorm => "batchnorm",
        }
    }

    /// Returns the default parameters for a new layer of this kind fed by `input`.
    pub fn default_params(&self, input: &Shape) -> LayerParams {
        match self {
            LayerKind::Input => LayerParams::Input,
            LayerKind::Convolution => LayerParams::Convolution(ConvParams {
                filters: input.leading(),
                ..ConvParams::default()
            }),
            LayerKind::MaxPool => LayerParams::MaxPool(PoolParams::default()),
            LayerKind::Linear => LayerParams::Linear {
                units: DEFAULT_LINEAR_UNITS,
            },
            LayerKind::Activation => LayerParams::Activation(Activation::default()),
            LayerKind::Flatten => LayerParams::Flatten,
            LayerKind::BatchNorm => LayerParams::BatchNorm,
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayerKind {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_lowercase();
        LayerKind::ALL
            .into_iter()
            .find(|kind| kind.name() == lower)
            .ok_or_else(|| GraphError::invalid_parameter(format!("unknown layer kind '{}'", s)))
    }
}

/// Units of a freshly inserted linear layer.
pub const DEFAULT_LINEAR_UNITS: usize = 64;

/// Parameters of a 2D convolution with square kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConvParams {
    pub filters: usize,
    pub kernel_size: usize,
    pub stride: usize,
    pub padding: usize,
}

impl Default for ConvParams {
    fn default() -> Self {
        Self {
            filters: 1,
            kernel_size: 3,
            stride: 1,
            padding: 1,
        }
    }
}

/// Parameters of a 2D max pooling layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolParams {
    pub pool_size: usize,
    pub stride: usize,
}

impl Default for PoolParams {
    fn default() -> Self {
        Self {
            pool_size: 2,
            stride: 2,
        }
    }
}

/// Kind-specific parameters of a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "params", rename_all = "lowercase")]
pub enum LayerParams {
    /// Network input; passes its shape through unchanged.
    Input,
    Convolution(ConvParams),
    /// Max pooling. Only `stride` enters the output shape.
    MaxPool(PoolParams),
    /// Fully connected layer over a `[features]` input.
    Linear { units: usize },
    Activation(Activation),
    Flatten,
    BatchNorm,
}

impl LayerParams {
    /// Returns the kind of these parameters.
    pub fn kind(&self) -> LayerKind {
        match self {
            LayerParams::Input => LayerKind::Input,
            LayerParams::Convolution(_) => LayerKind::Convolution,
            LayerParams::MaxPool(_) => LayerKind::MaxPool,
            LayerParams::Linear { .. } => LayerKind::Linear,
            LayerParams::Activation(_) => LayerKind::Activation,
            LayerParams::Flatten => LayerKind::Flatten,
            LayerParams::BatchNorm => LayerKind::BatchNorm,
        }
    }

    /// Computes the output shape produced from `input`.
    ///
    /// Fails instead of producing a zero dimension.
    pub fn output_shape(&self, input: &Shape) -> Result<Shape> {
        match self {
            LayerParams::Input
            | LayerParams::Activation(_)
            | LayerParams::BatchNorm => Ok(input.clone()),
            LayerParams::Convolution(conv) => {
                let (_, h, w) = input.as_image()?;
                if conv.stride == 0 {
                    return Err(GraphError::invalid_parameter("convolution stride must be positive"));
                }
                let out_h = conv_extent(h, conv)?;
                let out_w = conv_extent(w, conv)?;
                Shape::image(conv.filters, out_h, out_w)
            }
            LayerParams::MaxPool(pool) => {
                let (c, h, w) = input.as_image()?;
                if pool.stride == 0 {
                    return Err(GraphError::invalid_parameter("pooling stride must be positive"));
                }
                Shape::image(c, h / pool.stride, w / pool.stride).map_err(|_| {
                    GraphError::invalid_shape(format!(
                        "stride {} pools {} down to nothing",
                        pool.stride, input
                    ))
                })
            }
            LayerParams::Linear { units } => Shape::features(*units),
            LayerParams::Flatten => Shape::features(input.total()?),
        }
    }

    /// Counts trainable parameters (weights and biases) given the layer input.
    pub fn parameter_count(&self, input: &Shape) -> u64 {
        match self {
            LayerParams::Convolution(conv) => {
                let filters = conv.filters as u64;
                let kernel = conv.kernel_size as u64;
                filters * input.leading() as u64 * kernel * kernel + filters
            }
            LayerParams::Linear { units } => {
                let units = *units as u64;
                input.leading() as u64 * units + units
            }
            LayerParams::BatchNorm => 2 * input.leading() as u64,
            LayerParams::Input
            | LayerParams::MaxPool(_)
            | LayerParams::Activation(_)
            | LayerParams::Flatten => 0,
        }
    }

    /// Renders the PyTorch module expression for this layer.
    ///
    /// `alias` is the name `torch.nn` is imported under. The input layer
    /// renders as a Python comment.
    pub fn module_text(&self, input: &Shape, alias: &str) -> String {
        match self {
            LayerParams::Input => format!("# input: {}", input),
            LayerParams::Convolution(conv) => format!(
                "{}.Conv2d({}, {}, kernel_size={}, stride={}, padding={})",
                alias,
                input.leading(),
                conv.filters,
                conv.kernel_size,
                conv.stride,
                conv.padding
            ),
            LayerParams::MaxPool(pool) => format!(
                "{}.MaxPool2d(kernel_size={}, stride={})",
                alias, pool.pool_size, pool.stride
            ),
            LayerParams::Linear { units } => {
                format!("{}.Linear({}, {})", alias, input.leading(), units)
            }
            LayerParams::Activation(act) => {
                format!("{}.{}({})", alias, act.module_name(), act.module_args())
            }
            LayerParams::Flatten => format!("{}.Flatten()", alias),
            LayerParams::BatchNorm => format!("{}.BatchNorm2d({})", alias, input.leading()),
        }
    }
}

/// One spatial side of a convolution output: `floor((n + 2p - k) / s) + 1`.
fn conv_extent(n: usize, conv: &ConvParams) -> Result<usize> {
    let padded = conv
        .padding
        .checked_mul(2)
        .and_then(|pad| pad.checked_add(n))
        .ok_or_else(|| {
            GraphError::invalid_shape(format!("padding {} overflows the extent", conv.padding))
        })?;
    if conv.kernel_size == 0 || conv.kernel_size > padded {
        return Err(GraphError::invalid_shape(format!(
            "kernel {} does not fit a padded extent of {}",
            conv.kernel_size, padded
        )));
    }
    Ok((padded - conv.kernel_size) / conv.stride + 1)
}
