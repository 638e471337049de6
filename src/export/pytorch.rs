//! PyTorch source emission.

use super::config::ExportConfig;
use crate::graph::LayerGraph;
use crate::layers::LayerKind;

/// Emits a PyTorch `nn.Sequential` definition equivalent to `graph`.
///
/// One line per layer, in graph order. The input layer contributes a comment
/// line; its trailing comma falls inside the comment, so the text stays
/// valid Python.
///
/// # Example
///
/// ```
/// use netbuilder::export::{ExportConfig, emit};
/// use netbuilder::graph::LayerGraph;
///
/// let code = emit(&LayerGraph::default(), &ExportConfig::default());
/// assert!(code.starts_with("import torch\nimport torch.nn as nn\n"));
/// assert!(code.contains("    nn.Linear(3, 10),"));
/// ```
pub fn emit(graph: &LayerGraph, config: &ExportConfig) -> String {
    let alias = config.module_alias.as_str();
    let indent = " ".repeat(config.indent);

    let mut lines = vec!["import torch".to_string()];
    if alias != "torch.nn" {
        lines.push(format!("import torch.nn as {}", alias));
    }
    lines.push(String::new());
    lines.push(format!("{} = {}.Sequential(", config.model_name, alias));

    for layer in graph.iter() {
        if layer.kind() == LayerKind::Input && !config.include_input_comment {
            continue;
        }
        lines.push(format!("{}{},", indent, layer.module_text(alias)));
    }
    lines.push(")".to_string());

    if config.print_model {
        lines.push(String::new());
        lines.push(format!("print({})", config.model_name));
    }

    log::debug!("emitted {} layer lines", graph.len());
    lines.join("\n")
}
