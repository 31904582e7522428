//! chipvis renders the internal activity of a gate-level chip as an animated image.
//!
//! Three independently produced artifacts are correlated:
//!
//! - a Yosys netlist ([`YosysDesign`]) tells which net every standard cell drives
//! - a simulation waveform ([`WaveformSource`], usually a [`VcdWaveform`]) gives each net's value
//!   at every clock cycle
//! - a placed layout ([`PlacedLayout`]) gives every cell's position on the die
//!
//! A [`VisSession`] runs the run-wide phases once; each [`EncodingMode`] is then rendered into a
//! [`FrameSink`], one frame per clock cycle.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Per-cycle samples and activity encodings.
pub mod activity;
/// Run configuration.
pub mod config;
/// Placed layout and cell binding.
pub mod layout;
/// Netlist connectivity.
pub mod netlist;
/// Frame sinks.
pub mod output;
/// Frame rendering.
pub mod render;
/// Session-oriented run API.
pub mod session;
/// Waveform access and sampling.
pub mod wave;

pub use crate::foundation::core::{Palette, Rect, Rgb8};
pub use crate::foundation::error::{ChipVisError, ChipVisResult};
pub use crate::foundation::ids::{InstanceName, NetName, SignalPath};

pub use crate::activity::encode::{EncodedSample, EncodedSequence, Encoder};
pub use crate::activity::mode::EncodingMode;
pub use crate::activity::sample::{Sample, SampleSequence};
pub use crate::config::VisConfig;
pub use crate::layout::bind::{BoundCell, BoundLayout, NetSlot};
pub use crate::layout::placed::{LayoutInstance, PlacedLayout};
pub use crate::netlist::graph::ConnectivityGraph;
pub use crate::netlist::resolve::OutputNetIndex;
pub use crate::netlist::yosys::YosysDesign;
pub use crate::output::gif::GifSink;
pub use crate::output::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::render::frame::FrameRGBA;
pub use crate::render::pipeline::{RenderStats, RenderThreading};
pub use crate::render::renderer::FrameRenderer;
pub use crate::render::text::{SvgTextBackend, TextBackend, TextMetrics};
pub use crate::session::{ModeOutput, VisSession};
pub use crate::wave::memory::MemoryWaveform;
pub use crate::wave::vcd::VcdWaveform;
pub use crate::wave::{LogicLevel, LogicValue, Transition, WaveformSource};
