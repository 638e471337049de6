//! Allowed ranges for editable layer parameters.

use std::ops::RangeInclusive;

use crate::errors::{GraphError, Result};
use crate::layers::LayerParams;

/// Inclusive ranges every parameter update is checked against.
///
/// The defaults are the ranges offered by the interactive layer editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterLimits {
    pub filters: RangeInclusive<usize>,
    pub kernel_size: RangeInclusive<usize>,
    /// Only odd kernel sizes are accepted when set.
    pub odd_kernels_only: bool,
    pub conv_stride: RangeInclusive<usize>,
    pub padding: RangeInclusive<usize>,
    pub pool_size: RangeInclusive<usize>,
    pub pool_stride: RangeInclusive<usize>,
    pub units: RangeInclusive<usize>,
}

impl Default for ParameterLimits {
    fn default() -> Self {
        Self {
            filters: 1..=256,
            kernel_size: 1..=11,
            odd_kernels_only: true,
            conv_stride: 1..=4,
            padding: 0..=5,
            pool_size: 1..=5,
            pool_stride: 1..=5,
            units: 1..=1024,
        }
    }
}

impl ParameterLimits {
    /// Limits that accept any positive value.
    pub fn unbounded() -> Self {
        Self {
            filters: 1..=usize::MAX,
            kernel_size: 1..=usize::MAX,
            odd_kernels_only: false,
            conv_stride: 1..=usize::MAX,
            padding: 0..=usize::MAX,
            pool_size: 1..=usize::MAX,
            pool_stride: 1..=usize::MAX,
            units: 1..=usize::MAX,
        }
    }

    /// Sets the accepted filter range.
    pub fn filters(mut self, range: RangeInclusive<usize>) -> Self {
        self.filters = range;
        self
    }

    /// Sets the accepted linear unit range.
    pub fn units(mut self, range: RangeInclusive<usize>) -> Self {
        self.units = range;
        self
    }

    /// Checks every numeric field of `params`.
    pub fn check(&self, params: &LayerParams) -> Result<()> {
        match params {
            LayerParams::Convolution(conv) => {
                within("filters", conv.filters, &self.filters)?;
                within("kernel_size", conv.kernel_size, &self.kernel_size)?;
                within("stride", conv.stride, &self.conv_stride)?;
                within("padding", conv.padding, &self.padding)?;
                if self.odd_kernels_only && conv.kernel_size % 2 == 0 {
                    return Err(GraphError::invalid_parameter(format!(
                        "kernel_size must be odd, got {}",
                        conv.kernel_size
                    )));
                }
                Ok(())
            }
            LayerParams::MaxPool(pool) => {
                within("pool_size", pool.pool_size, &self.pool_size)?;
                within("stride", pool.stride, &self.pool_stride)
            }
            LayerParams::Linear { units } => within("units", *units, &self.units),
            LayerParams::Input
            | LayerParams::Activation(_)
            | LayerParams::Flatten
            | LayerParams::BatchNorm => Ok(()),
        }
    }
}

fn within(name: &'static str, value: usize, range: &RangeInclusive<usize>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(GraphError::ParameterOutOfRange {
            name,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{Activation, ConvParams, PoolParams};

    #[test]
    fn test_default_limits_accept_defaults() {
        let limits = ParameterLimits::default();
        assert!(limits
            .check(&LayerParams::Convolution(ConvParams::default()))
            .is_ok());
        assert!(limits
            .check(&LayerParams::MaxPool(PoolParams::default()))
            .is_ok());
        assert!(limits.check(&LayerParams::Linear { units: 64 }).is_ok());
        assert!(limits
            .check(&LayerParams::Activation(Activation::Softmax))
            .is_ok());
    }

    #[test]
    fn test_out_of_range_reports_field() {
        let limits = ParameterLimits::default();
        let err = limits
            .check(&LayerParams::Linear { units: 2048 })
            .unwrap_err();
        assert!(matches!(
            err,
            GraphError::ParameterOutOfRange {
                name: "units",
                value: 2048,
                min: 1,
                max: 1024
            }
        ));

        let err = limits
            .check(&LayerParams::MaxPool(PoolParams {
                pool_size: 2,
                stride: 0,
            }))
            .unwrap_err();
        assert!(matches!(
            err,
            GraphError::ParameterOutOfRange { name: "stride", .. }
        ));
    }

    #[test]
    fn test_even_kernel_rejected() {
        let params = LayerParams::Convolution(ConvParams {
            kernel_size: 4,
            ..ConvParams::default()
        });
        assert!(matches!(
            ParameterLimits::default().check(&params),
            Err(GraphError::InvalidParameter { .. })
        ));
        assert!(ParameterLimits::unbounded().check(&params).is_ok());
    }

    #[test]
    fn test_custom_ranges() {
        let limits = ParameterLimits::default().filters(1..=8).units(10..=10);
        assert!(limits
            .check(&LayerParams::Convolution(ConvParams {
                filters: 16,
                ..ConvParams::default()
            }))
            .is_err());
        assert!(limits.check(&LayerParams::Linear { units: 10 }).is_ok());
        assert!(limits.check(&LayerParams::Linear { units: 11 }).is_err());
    }
}
