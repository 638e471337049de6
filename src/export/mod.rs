//! Read-only views of a graph: PyTorch source and the summary table.
//!
//! - PyTorch `nn.Sequential` emission
//! - Export configuration
//! - Per-layer shapes and parameter counts

mod config;
mod pytorch;
mod summary;

pub use config::ExportConfig;
pub use pytorch::emit;
pub use summary::{GraphSummary, LayerSummary};
