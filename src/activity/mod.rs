//! Per-cycle samples and the activity encodings derived from them.

/// Encodings built on top of the per-net fold.
pub mod encode;
/// Generic per-net stateful fold.
pub mod fold;
/// Encoding mode identifiers.
pub mod mode;
/// Raw per-cycle samples.
pub mod sample;

#[cfg(test)]
#[path = "../../tests/unit/activity/encode.rs"]
mod tests;
