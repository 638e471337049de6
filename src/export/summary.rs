//! Read-only per-layer summary of a graph.

use std::fmt;

use serde::Serialize;

use crate::errors::Result;
use crate::graph::LayerGraph;
use crate::layers::{LayerId, LayerKind, Shape};

/// One row of the summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerSummary {
    pub index: usize,
    pub id: LayerId,
    pub kind: LayerKind,
    pub locked: bool,
    pub input_shape: Shape,
    pub output_shape: Shape,
    pub parameters: u64,
}

/// Shapes and parameter counts of every layer, plus the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub layers: Vec<LayerSummary>,
    pub total_parameters: u64,
}

impl GraphSummary {
    /// Summarizes the current state of `graph`.
    pub fn of(graph: &LayerGraph) -> Self {
        let layers: Vec<LayerSummary> = graph
            .iter()
            .enumerate()
            .map(|(index, layer)| LayerSummary {
                index,
                id: layer.id(),
                kind: layer.kind(),
                locked: layer.is_locked(),
                input_shape: layer.input_shape().clone(),
                output_shape: layer.output_shape().clone(),
                parameters: layer.parameter_count(),
            })
            .collect();
        let total_parameters = layers.iter().map(|row| row.parameters).sum();
        Self {
            layers,
            total_parameters,
        }
    }

    /// Serializes the summary to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.layers.len().saturating_sub(1);
        for row in &self.layers {
            write!(f, "{}", row.kind.name().to_uppercase())?;
            if row.index == last {
                f.write_str(" (Output)")?;
            }
            write!(f, "  In: {} -> Out: {}", row.input_shape, row.output_shape)?;
            if row.locked {
                f.write_str("  LOCKED")?;
            }
            writeln!(f)?;
        }
        write!(f, "Total params: {}", self.total_parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_summary_rows() {
        let mut graph = LayerGraph::default();
        graph.push_layer(LayerKind::MaxPool).unwrap();
        let summary = graph.summary();

        assert_eq!(summary.layers.len(), 3);
        assert_eq!(summary.layers[1].kind, LayerKind::MaxPool);
        assert_eq!(summary.layers[1].output_shape.dims(), &[3, 112, 112]);
        assert_eq!(summary.total_parameters, graph.total_parameters());
    }

    #[test]
    fn test_summary_display() {
        let summary = LayerGraph::default().summary();
        assert_eq!(
            summary.to_string(),
            "CONVOLUTION  In: 3x224x224 -> Out: 3x224x224  LOCKED\n\
             LINEAR (Output)  In: 3x224x224 -> Out: 10  LOCKED\n\
             Total params: 124"
        );
    }

    #[test]
    fn test_summary_json() {
        let summary = LayerGraph::default().summary();
        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(json["total_parameters"], 124);
        assert_eq!(json["layers"][0]["kind"], "convolution");
        assert_eq!(json["layers"][0]["input_shape"], serde_json::json!([3, 224, 224]));
        assert_eq!(json["layers"][1]["locked"], true);
    }
}
