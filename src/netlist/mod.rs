//! Connectivity resolution from the synthesized netlist.

/// Instance role classification.
pub mod classify;
/// Top-module connectivity graph.
pub mod graph;
/// Output-net resolution and driver index.
pub mod resolve;
/// Yosys JSON document model.
pub mod yosys;

#[cfg(test)]
#[path = "../../tests/unit/netlist/resolve.rs"]
mod tests;
