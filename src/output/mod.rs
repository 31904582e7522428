//! Frame sinks and output naming.

/// Animated GIF output.
pub mod gif;
/// Sink contract and the in-memory sink.
pub mod sink;

#[cfg(test)]
#[path = "../../tests/unit/output/gif.rs"]
mod tests;
