//! LayerGraph - an ordered, shape-consistent sequence of layers.

use std::collections::HashSet;

use super::limits::ParameterLimits;
use super::propagate::{find_discontinuity, propagate};
use crate::errors::{GraphError, Result};
use crate::export::{self, ExportConfig, GraphSummary};
use crate::layers::{
    ConvParams, Layer, LayerDraft, LayerId, LayerKind, LayerParams, LayerUpdate, Shape,
};

/// A strictly linear sequence of layers.
///
/// The graph keeps three invariants across every mutation:
/// - each layer's input shape equals its predecessor's output shape,
/// - the first and last layers never move and are never removed,
/// - there are always at least two layers.
///
/// Mutations run on a scratch copy and only replace the layers once
/// propagation succeeded, so a rejected call leaves the graph untouched.
///
/// # Example
///
/// ```
/// use netbuilder::graph::LayerGraph;
/// use netbuilder::layers::LayerKind;
///
/// let mut graph = LayerGraph::default();
/// graph.push_layer(LayerKind::MaxPool).unwrap();
/// graph.push_layer(LayerKind::Flatten).unwrap();
///
/// assert_eq!(graph.layers()[2].output_shape().dims(), &[3 * 112 * 112]);
/// assert!(graph.emit_module_text().contains("nn.Flatten()"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerGraph {
    layers: Vec<Layer>,
    limits: ParameterLimits,
}

impl LayerGraph {
    /// Creates a graph from at least two layers and propagates shapes
    /// from the first layer onward.
    ///
    /// Every layer id must appear once.
    pub fn new(layers: Vec<Layer>) -> Result<Self> {
        if layers.len() < 2 {
            return Err(GraphError::TooFewLayers {
                count: layers.len(),
            });
        }
        let mut seen = HashSet::with_capacity(layers.len());
        if let Some(duplicate) = layers.iter().find(|layer| !seen.insert(layer.id())) {
            return Err(GraphError::DuplicateLayerId {
                id: duplicate.id().to_string(),
            });
        }
        let mut graph = Self {
            layers: Vec::new(),
            limits: ParameterLimits::default(),
        };
        graph.replace(layers, 1)?;
        Ok(graph)
    }

    /// Replaces the limits used to validate parameter updates.
    pub fn with_limits(mut self, limits: ParameterLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns the limits parameter updates are checked against.
    pub fn limits(&self) -> &ParameterLimits {
        &self.limits
    }

    /// Returns the layers in order, input first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Iterates over the layers in order.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// Returns the number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always false; a graph holds at least two layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Returns the network input layer.
    pub fn first(&self) -> &Layer {
        &self.layers[0]
    }

    /// Returns the network output layer.
    pub fn last(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    /// Returns the position of the layer with `id`.
    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id() == id)
    }

    /// Returns the layer with `id`.
    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id() == id)
    }

    /// Returns true when the index is the first or last position.
    pub fn is_boundary(&self, index: usize) -> bool {
        index == 0 || index + 1 == self.layers.len()
    }

    /// Inserts a new unlocked layer of `kind` before the layer at `at_index`.
    ///
    /// The new layer starts from its predecessor's output shape and its
    /// kind's default parameters. Valid positions are `1..len`; anything
    /// that would displace the first or last layer is rejected.
    pub fn insert(&mut self, kind: LayerKind, at_index: usize) -> Result<LayerId> {
        self.try_insert(kind, at_index).inspect_err(|err| {
            log::warn!("rejected insert of {} at {}: {}", kind, at_index, err);
        })
    }

    /// Inserts a new layer just before the output layer.
    pub fn push_layer(&mut self, kind: LayerKind) -> Result<LayerId> {
        self.insert(kind, self.layers.len() - 1)
    }

    /// Removes a layer that is neither the first nor the last.
    pub fn delete(&mut self, id: LayerId) -> Result<Layer> {
        self.try_delete(id).inspect_err(|err| {
            log::warn!("rejected delete of {}: {}", id, err);
        })
    }

    /// Moves the layer at `from_index` to `to_index`, shifting the layers in
    /// between by one. Boundary positions are protected the same way
    /// [`delete`](Self::delete) protects them.
    pub fn reorder(&mut self, from_index: usize, to_index: usize) -> Result<()> {
        self.try_reorder(from_index, to_index).inspect_err(|err| {
            log::warn!("rejected reorder {} -> {}: {}", from_index, to_index, err);
        })
    }

    /// Applies `update` to the layer with `id` and cascades the new output
    /// shape downstream. The layer's input shape is not changed.
    pub fn update_parameters(&mut self, id: LayerId, update: LayerUpdate) -> Result<()> {
        self.try_update(id, update).inspect_err(|err| {
            log::warn!("rejected update of {}: {}", id, err);
        })
    }

    /// Locks or unlocks a layer.
    ///
    /// Unlocking re-derives the layer's output shape from its parameters.
    pub fn set_locked(&mut self, id: LayerId, locked: bool) -> Result<()> {
        self.update_parameters(id, LayerUpdate::locked(locked))
    }

    /// Starts an edit of the layer with `id`.
    pub fn draft(&self, id: LayerId) -> Result<LayerDraft> {
        self.get(id)
            .map(LayerDraft::of)
            .ok_or_else(|| not_found(id))
    }

    /// Commits a draft produced by [`draft`](Self::draft).
    pub fn commit(&mut self, draft: LayerDraft) -> Result<()> {
        let (id, update) = draft.into_update();
        self.update_parameters(id, update)
    }

    /// Re-runs propagation over the whole graph.
    pub fn refresh(&mut self) -> Result<()> {
        self.replace(self.layers.clone(), 1)
    }

    /// Sums the trainable parameters of every layer.
    pub fn total_parameters(&self) -> u64 {
        self.layers.iter().map(Layer::parameter_count).sum()
    }

    /// Emits PyTorch source for the graph with the default export settings.
    pub fn emit_module_text(&self) -> String {
        export::emit(self, &ExportConfig::default())
    }

    /// Builds the per-layer summary table.
    pub fn summary(&self) -> GraphSummary {
        GraphSummary::of(self)
    }

    fn try_insert(&mut self, kind: LayerKind, at_index: usize) -> Result<LayerId> {
        let len = self.layers.len();
        if at_index > len {
            return Err(GraphError::IndexOutOfRange {
                index: at_index,
                len,
            });
        }
        if at_index == 0 || at_index == len {
            return Err(GraphError::BoundaryLayerProtected { index: at_index });
        }
        if kind == LayerKind::Input {
            return Err(GraphError::invalid_parameter(
                "an input layer can only start a graph",
            ));
        }

        let input = self.layers[at_index - 1].output_shape().clone();
        let layer = Layer::with_defaults(kind, input)?;
        let id = layer.id();

        let mut candidate = self.layers.clone();
        candidate.insert(at_index, layer);
        self.replace(candidate, at_index)?;
        log::debug!("inserted {} {} at {}", kind, id, at_index);
        Ok(id)
    }

    fn try_delete(&mut self, id: LayerId) -> Result<Layer> {
        let index = self.index_of(id).ok_or_else(|| not_found(id))?;
        if self.is_boundary(index) {
            return Err(GraphError::BoundaryLayerProtected { index });
        }

        let mut candidate = self.layers.clone();
        let removed = candidate.remove(index);
        self.replace(candidate, index - 1)?;
        log::debug!("deleted {} {} from {}", removed.kind(), id, index);
        Ok(removed)
    }

    fn try_reorder(&mut self, from_index: usize, to_index: usize) -> Result<()> {
        let len = self.layers.len();
        for index in [from_index, to_index] {
            if index >= len {
                return Err(GraphError::IndexOutOfRange { index, len });
            }
        }
        if from_index == to_index {
            return Ok(());
        }
        for index in [from_index, to_index] {
            if self.is_boundary(index) {
                return Err(GraphError::BoundaryLayerProtected { index });
            }
        }

        let mut candidate = self.layers.clone();
        let layer = candidate.remove(from_index);
        candidate.insert(to_index, layer);
        self.replace(candidate, from_index.min(to_index))?;
        log::debug!("moved layer {} -> {}", from_index, to_index);
        Ok(())
    }

    fn try_update(&mut self, id: LayerId, update: LayerUpdate) -> Result<()> {
        let index = self.index_of(id).ok_or_else(|| not_found(id))?;
        if update.is_empty() {
            return Ok(());
        }

        let mut candidate = self.layers.clone();
        let layer = &mut candidate[index];
        if let Some(params) = update.params {
            // only changed parameters are held to the limits
            if &params != layer.params() {
                self.limits.check(&params)?;
            }
            layer.set_params(params)?;
        }
        if let Some(locked) = update.locked {
            layer.set_locked(locked)?;
        }
        layer.recompute_output()?;

        self.replace(candidate, index)?;
        log::debug!("updated {} at {}", id, index);
        Ok(())
    }

    /// Propagates `candidate` from `start_index` and adopts it on success.
    fn replace(&mut self, mut candidate: Vec<Layer>, start_index: usize) -> Result<()> {
        propagate(&mut candidate, start_index)?;
        debug_assert_eq!(find_discontinuity(&candidate), None);
        self.layers = candidate;
        Ok(())
    }
}

impl Default for LayerGraph {
    /// The starter network: a locked 3x3 convolution over a 3x224x224 image
    /// followed by a locked 10-unit linear output layer.
    fn default() -> Self {
        let image = Shape::image(3, 224, 224).expect("3x224x224 is a valid shape");
        let conv = LayerParams::Convolution(ConvParams {
            filters: 3,
            kernel_size: 3,
            stride: 1,
            padding: 1,
        });
        let layers = Layer::new(conv, image)
            .and_then(|first| first.locked(true))
            .and_then(|first| {
                let output = Layer::new(
                    LayerParams::Linear { units: 10 },
                    first.output_shape().clone(),
                )?
                .locked(true)?;
                Ok(vec![first, output])
            })
            .and_then(Self::new);
        layers.expect("starter network shapes are valid")
    }
}

fn not_found(id: LayerId) -> GraphError {
    GraphError::LayerNotFound { id: id.to_string() }
}
