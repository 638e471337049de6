//! Tensor shapes flowing between layers.

use std::fmt;

use serde::Serialize;

use crate::errors::{GraphError, Result};

/// An ordered sequence of positive tensor dimensions.
///
/// Convolutional layers read it as `[channels, height, width]`, linear
/// layers as `[features]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Creates a shape from its dimensions.
    ///
    /// Fails when `dims` is empty or contains a zero.
    pub fn new(dims: Vec<usize>) -> Result<Self> {
        if dims.is_empty() {
            return Err(GraphError::invalid_shape("shape has no dimensions"));
        }
        if dims.contains(&0) {
            return Err(GraphError::invalid_shape(format!(
                "shape {:?} contains a zero dimension",
                dims
            )));
        }
        Ok(Self { dims })
    }

    /// Creates a one-dimensional `[features]` shape.
    pub fn features(features: usize) -> Result<Self> {
        Self::new(vec![features])
    }

    /// Creates a `[channels, height, width]` shape.
    pub fn image(channels: usize, height: usize, width: usize) -> Result<Self> {
        Self::new(vec![channels, height, width])
    }

    /// Returns the dimensions.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the leading dimension: channels for images, features for vectors.
    pub fn leading(&self) -> usize {
        self.dims[0]
    }

    /// Returns the product of all dimensions.
    ///
    /// Fails when the product does not fit in a `usize`.
    pub fn total(&self) -> Result<usize> {
        self.dims
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
            .ok_or_else(|| {
                GraphError::invalid_shape(format!("{} has too many elements to count", self))
            })
    }

    /// Splits a rank-3 shape into `(channels, height, width)`.
    pub fn as_image(&self) -> Result<(usize, usize, usize)> {
        match self.dims.as_slice() {
            &[c, h, w] => Ok((c, h, w)),
            _ => Err(GraphError::invalid_shape(format!(
                "expected a [channels, height, width] shape, got {}",
                self
            ))),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, dim) in self.dims.iter().enumerate() {
            if i > 0 {
                f.write_str("x")?;
            }
            write!(f, "{}", dim)?;
        }
        Ok(())
    }
}
