//! Frame rendering: geometry, blur, status text and the frame pipeline.

/// Box blur with black restore.
pub mod blur;
/// RGBA frame buffer.
pub mod frame;
/// Chunked, optionally parallel frame production.
pub mod pipeline;
/// Per-sample frame renderer.
pub mod renderer;
/// Status text measurement, fitting and drawing.
pub mod text;

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
