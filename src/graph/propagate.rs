//! Forward shape propagation.

use crate::errors::{GraphError, Result};
use crate::layers::Layer;

/// Re-derives shapes for every layer from `start_index` to the end.
///
/// Each layer's input shape is set to its predecessor's output shape.
/// Unlocked layers then recompute their output shape; locked layers keep
/// theirs. Layers before `start_index` are never touched, and index 0 has no
/// predecessor so the loop starts at 1 at the earliest.
///
/// On error the slice may be partially updated; callers propagate on a
/// scratch copy.
pub fn propagate(layers: &mut [Layer], start_index: usize) -> Result<()> {
    let start = start_index.max(1);
    for i in start..layers.len() {
        let input = layers[i - 1].output_shape().clone();
        let layer = &mut layers[i];
        let kind = layer.kind();
        layer.set_input_shape(input).map_err(|err| match err {
            GraphError::InvalidShape { message } => {
                GraphError::invalid_shape(format!("layer {} ({}): {}", i, kind, message))
            }
            other => other,
        })?;
    }
    log::debug!(
        "propagated shapes over layers {}..{}",
        start,
        layers.len()
    );
    Ok(())
}

/// Returns the index of the first adjacent pair whose shapes disagree.
pub fn find_discontinuity(layers: &[Layer]) -> Option<usize> {
    layers
        .windows(2)
        .position(|pair| pair[1].input_shape() != pair[0].output_shape())
        .map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{ConvParams, LayerKind, LayerParams, Shape};

    fn stack() -> Vec<Layer> {
        let input = Shape::image(3, 32, 32).unwrap();
        let conv = Layer::new(
            LayerParams::Convolution(ConvParams {
                filters: 8,
                ..ConvParams::default()
            }),
            input.clone(),
        )
        .unwrap();
        vec![
            Layer::input(input.clone()),
            conv,
            Layer::with_defaults(LayerKind::MaxPool, input.clone()).unwrap(),
            Layer::with_defaults(LayerKind::Flatten, input.clone()).unwrap(),
            Layer::new(LayerParams::Linear { units: 10 }, input).unwrap(),
        ]
    }

    #[test]
    fn test_propagate_restores_continuity() {
        let mut layers = stack();
        assert_eq!(find_discontinuity(&layers), Some(2));

        propagate(&mut layers, 0).unwrap();
        assert_eq!(find_discontinuity(&layers), None);
        assert_eq!(layers[2].output_shape().dims(), &[8, 16, 16]);
        assert_eq!(layers[3].output_shape().dims(), &[2048]);
        assert_eq!(layers[4].input_shape().dims(), &[2048]);
    }

    #[test]
    fn test_propagate_is_idempotent() {
        let mut layers = stack();
        propagate(&mut layers, 1).unwrap();
        let once = layers.clone();
        propagate(&mut layers, 1).unwrap();
        assert_eq!(layers, once);
    }

    #[test]
    fn test_propagate_leaves_earlier_layers_alone() {
        let mut layers = stack();
        let before = layers[2].clone();
        propagate(&mut layers, 3).unwrap();
        assert_eq!(layers[2], before);
        assert_eq!(layers[3].input_shape(), layers[2].output_shape());
    }

    #[test]
    fn test_propagate_reports_failing_layer() {
        let tiny = Shape::image(1, 1, 1).unwrap();
        let mut layers = vec![
            Layer::input(tiny.clone()),
            Layer::with_defaults(LayerKind::MaxPool, Shape::image(1, 4, 4).unwrap()).unwrap(),
        ];
        let err = propagate(&mut layers, 1).unwrap_err();
        match err {
            GraphError::InvalidShape { message } => assert!(message.starts_with("layer 1 (maxpool)")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
