use crate::{foundation::error::ChipVisResult, render::frame::FrameRGBA};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second.
    pub fps: u32,
}

/// Sink contract for consuming rendered frames in cycle order.
///
/// `push_frame` is called with strictly increasing indices, starting at 0.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ChipVisResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: u64, frame: &FrameRGBA) -> ChipVisResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> ChipVisResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(u64, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(u64, FrameRGBA)] {
        &self.frames
    }

    /// Whether `end` was called.
    pub fn is_finished(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ChipVisResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &FrameRGBA) -> ChipVisResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ChipVisResult<()> {
        self.ended = true;
        Ok(())
    }
}
