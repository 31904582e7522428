use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    activity::{
        encode::{EncodedSequence, Encoder},
        mode::EncodingMode,
        sample::SampleSequence,
    },
    config::VisConfig,
    foundation::error::ChipVisResult,
    layout::{bind::BoundLayout, placed::PlacedLayout},
    netlist::{graph::ConnectivityGraph, resolve::OutputNetIndex, yosys::YosysDesign},
    output::{
        gif::{GifSink, output_path_for_mode, validate_output_path},
        sink::FrameSink,
    },
    render::{
        pipeline::{RenderStats, render_sequence},
        renderer::FrameRenderer,
        text::TextBackend,
    },
    wave::{WaveformSource, sampler::WaveformSampler},
};

/// One finished output file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeOutput {
    /// Encoding rendered into the file.
    pub mode: EncodingMode,
    /// Written path.
    pub path: PathBuf,
    /// Frame counts.
    pub stats: RenderStats,
}

/// A prepared visualization run.
///
/// Preparation front-loads every run-wide phase (connectivity, sampling, layout binding, text
/// fitting); afterwards each encoding mode can be rendered independently into any sink.
pub struct VisSession {
    cfg: VisConfig,
    outputs: OutputNetIndex,
    samples: SampleSequence,
    layout: BoundLayout,
    renderer: FrameRenderer,
    encoder: Encoder,
}

impl VisSession {
    /// Resolve, sample and bind the three inputs, then fit the status text.
    #[tracing::instrument(skip_all)]
    pub fn prepare<W: WaveformSource + ?Sized>(
        cfg: VisConfig,
        design: &YosysDesign,
        wave: &W,
        layout: &PlacedLayout,
        text: Arc<dyn TextBackend>,
    ) -> ChipVisResult<Self> {
        let cfg = cfg.validated()?;

        let graph = ConnectivityGraph::from_yosys(design, &cfg)?;
        let outputs = OutputNetIndex::resolve(&graph)?;
        tracing::info!(
            nets = graph.net_count(),
            output_nets = outputs.output_net_count(),
            "connectivity resolved"
        );

        let samples = WaveformSampler::new(wave, &cfg).sample(&outputs)?;
        let bound = BoundLayout::bind(layout, &outputs, samples.nets.clone(), &cfg)?;

        let labels: Vec<&str> = samples.cycles.iter().map(|s| s.label.as_str()).collect();
        let renderer = FrameRenderer::new(&bound, &cfg, text, labels)?;
        let (width, height) = renderer.frame_size();
        tracing::info!(width, height, cycles = samples.len(), "session prepared");

        let encoder = Encoder::new(&cfg);
        Ok(Self {
            cfg,
            outputs,
            samples,
            layout: bound,
            renderer,
            encoder,
        })
    }

    /// Normalized configuration of the run.
    pub fn config(&self) -> &VisConfig {
        &self.cfg
    }

    /// Output nets and their drivers.
    pub fn outputs(&self) -> &OutputNetIndex {
        &self.outputs
    }

    /// Sampled cycles, trimmed to the start marker.
    pub fn samples(&self) -> &SampleSequence {
        &self.samples
    }

    /// Bound layout geometry.
    pub fn layout(&self) -> &BoundLayout {
        &self.layout
    }

    /// Shared frame renderer.
    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }

    /// Encode the sampled cycles under `mode`.
    pub fn encode(&self, mode: EncodingMode) -> EncodedSequence {
        self.encoder.encode(mode, &self.samples)
    }

    /// Render every cycle of `mode` into `sink`.
    pub fn render_mode(
        &self,
        mode: EncodingMode,
        sink: &mut dyn FrameSink,
    ) -> ChipVisResult<RenderStats> {
        let seq = self.encode(mode);
        render_sequence(
            &self.renderer,
            &seq,
            self.cfg.fps,
            &self.cfg.threading,
            sink,
        )
    }

    /// Render every configured mode to a GIF next to `out`.
    ///
    /// With a single mode the file is `out` itself; otherwise each mode gets `<stem>_<index>.gif`.
    #[tracing::instrument(skip(self))]
    pub fn render_to_gif(&self, out: &Path) -> ChipVisResult<Vec<ModeOutput>> {
        validate_output_path(out)?;
        let multi = self.cfg.modes.len() > 1;
        let mut written = Vec::with_capacity(self.cfg.modes.len());
        for &mode in &self.cfg.modes {
            let path = output_path_for_mode(out, mode, multi);
            tracing::info!(%mode, path = %path.display(), "rendering mode");
            let mut sink = GifSink::new(&path)?;
            let stats = self.render_mode(mode, &mut sink)?;
            written.push(ModeOutput { mode, path, stats });
        }
        Ok(written)
    }
}
