//! Draft-then-commit editing of a single layer.
//!
//! A [`LayerDraft`] is a detached copy of one layer's editable fields. It is
//! edited freely and has no effect until it is committed back to the graph,
//! which validates it and re-propagates shapes.

use super::activation::Activation;
use super::layer::{Layer, LayerId};
use super::params::{LayerKind, LayerParams};
use crate::errors::{GraphError, Result};

/// A partial update of a layer's editable fields.
///
/// `None` leaves the corresponding field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerUpdate {
    pub params: Option<LayerParams>,
    pub locked: Option<bool>,
}

impl LayerUpdate {
    /// An update replacing the parameters.
    pub fn params(params: LayerParams) -> Self {
        Self {
            params: Some(params),
            locked: None,
        }
    }

    /// An update changing only the lock flag.
    pub fn locked(locked: bool) -> Self {
        Self {
            params: None,
            locked: Some(locked),
        }
    }

    /// Returns true when nothing would change.
    pub fn is_empty(&self) -> bool {
        self.params.is_none() && self.locked.is_none()
    }
}

/// Pending edits to one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDraft {
    id: LayerId,
    params: LayerParams,
    locked: bool,
}

impl LayerDraft {
    /// Starts a draft from the current state of `layer`.
    pub fn of(layer: &Layer) -> Self {
        Self {
            id: layer.id(),
            params: layer.params().clone(),
            locked: layer.is_locked(),
        }
    }

    /// Returns the id of the layer this draft edits.
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Returns the kind of the drafted layer.
    pub fn kind(&self) -> LayerKind {
        self.params.kind()
    }

    /// Returns the drafted parameters.
    pub fn params(&self) -> &LayerParams {
        &self.params
    }

    /// Returns the drafted lock flag.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Sets the lock flag.
    pub fn set_locked(&mut self, locked: bool) -> &mut Self {
        self.locked = locked;
        self
    }

    /// Flips the lock flag.
    pub fn toggle_locked(&mut self) -> &mut Self {
        self.locked = !self.locked;
        self
    }

    /// Replaces all parameters at once.
    pub fn set_params(&mut self, params: LayerParams) -> Result<&mut Self> {
        if params.kind() != self.kind() {
            return Err(self.mismatch(params.kind()));
        }
        self.params = params;
        Ok(self)
    }

    /// Sets the number of output channels of a convolution.
    pub fn set_filters(&mut self, filters: usize) -> Result<&mut Self> {
        match &mut self.params {
            LayerParams::Convolution(conv) => conv.filters = filters,
            _ => return Err(self.mismatch(LayerKind::Convolution)),
        }
        Ok(self)
    }

    /// Sets the kernel size of a convolution.
    pub fn set_kernel_size(&mut self, kernel_size: usize) -> Result<&mut Self> {
        match &mut self.params {
            LayerParams::Convolution(conv) => conv.kernel_size = kernel_size,
            _ => return Err(self.mismatch(LayerKind::Convolution)),
        }
        Ok(self)
    }

    /// Sets the zero padding of a convolution.
    pub fn set_padding(&mut self, padding: usize) -> Result<&mut Self> {
        match &mut self.params {
            LayerParams::Convolution(conv) => conv.padding = padding,
            _ => return Err(self.mismatch(LayerKind::Convolution)),
        }
        Ok(self)
    }

    /// Sets the stride of a convolution or pooling layer.
    pub fn set_stride(&mut self, stride: usize) -> Result<&mut Self> {
        match &mut self.params {
            LayerParams::Convolution(conv) => conv.stride = stride,
            LayerParams::MaxPool(pool) => pool.stride = stride,
            _ => {
                return Err(GraphError::KindMismatch {
                    expected: "convolution or maxpool",
                    actual: self.kind().name(),
                })
            }
        }
        Ok(self)
    }

    /// Sets the window size of a pooling layer.
    pub fn set_pool_size(&mut self, pool_size: usize) -> Result<&mut Self> {
        match &mut self.params {
            LayerParams::MaxPool(pool) => pool.pool_size = pool_size,
            _ => return Err(self.mismatch(LayerKind::MaxPool)),
        }
        Ok(self)
    }

    /// Sets the output units of a linear layer.
    pub fn set_units(&mut self, units: usize) -> Result<&mut Self> {
        match &mut self.params {
            LayerParams::Linear { units: current } => *current = units,
            _ => return Err(self.mismatch(LayerKind::Linear)),
        }
        Ok(self)
    }

    /// Sets the function of an activation layer.
    pub fn set_activation(&mut self, activation: Activation) -> Result<&mut Self> {
        match &mut self.params {
            LayerParams::Activation(current) => *current = activation,
            _ => return Err(self.mismatch(LayerKind::Activation)),
        }
        Ok(self)
    }

    /// Converts the draft into the update it represents.
    pub fn into_update(self) -> (LayerId, LayerUpdate) {
        (
            self.id,
            LayerUpdate {
                params: Some(self.params),
                locked: Some(self.locked),
            },
        )
    }

    fn mismatch(&self, expected: LayerKind) -> GraphError {
        GraphError::KindMismatch {
            expected: expected.name(),
            actual: self.kind().name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::params::{ConvParams, PoolParams};
    use crate::layers::shape::Shape;

    fn conv_layer() -> Layer {
        Layer::with_defaults(LayerKind::Convolution, Shape::image(3, 32, 32).unwrap()).unwrap()
    }

    #[test]
    fn test_draft_edits_do_not_touch_layer() {
        let layer = conv_layer();
        let mut draft = LayerDraft::of(&layer);
        draft.set_filters(64).unwrap().set_stride(2).unwrap();

        assert_eq!(
            draft.params(),
            &LayerParams::Convolution(ConvParams {
                filters: 64,
                kernel_size: 3,
                stride: 2,
                padding: 1,
            })
        );
        assert_eq!(
            layer.params(),
            &LayerParams::Convolution(ConvParams {
                filters: 3,
                ..ConvParams::default()
            })
        );
    }

    #[test]
    fn test_draft_rejects_fields_of_other_kinds() {
        let mut draft = LayerDraft::of(&conv_layer());
        assert!(matches!(
            draft.set_units(10),
            Err(GraphError::KindMismatch {
                expected: "linear",
                actual: "convolution"
            })
        ));
        assert!(draft.set_params(LayerParams::Flatten).is_err());
        assert!(draft.set_activation(Activation::Tanh).is_err());
    }

    #[test]
    fn test_stride_mismatch_names_both_kinds() {
        let linear =
            Layer::with_defaults(LayerKind::Linear, Shape::features(8).unwrap()).unwrap();
        let mut draft = LayerDraft::of(&linear);
        assert!(matches!(
            draft.set_stride(2),
            Err(GraphError::KindMismatch {
                expected: "convolution or maxpool",
                actual: "linear"
            })
        ));
    }

    #[test]
    fn test_stride_applies_to_pooling() {
        let pool =
            Layer::with_defaults(LayerKind::MaxPool, Shape::image(3, 32, 32).unwrap()).unwrap();
        let mut draft = LayerDraft::of(&pool);
        draft.set_stride(1).unwrap().set_pool_size(3).unwrap();
        assert_eq!(
            draft.params(),
            &LayerParams::MaxPool(PoolParams {
                pool_size: 3,
                stride: 1,
            })
        );
    }

    #[test]
    fn test_into_update_carries_lock_and_params() {
        let layer = conv_layer();
        let mut draft = LayerDraft::of(&layer);
        draft.toggle_locked();
        let (id, update) = draft.into_update();
        assert_eq!(id, layer.id());
        assert_eq!(update.locked, Some(true));
        assert_eq!(update.params.as_ref(), Some(layer.params()));
    }

    #[test]
    fn test_empty_update() {
        assert!(LayerUpdate::default().is_empty());
        assert!(!LayerUpdate::locked(true).is_empty());
    }
}
