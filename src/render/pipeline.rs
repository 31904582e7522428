use std::collections::HashMap;

use rayon::prelude::*;

use crate::{
    activity::encode::{EncodedSample, EncodedSequence},
    foundation::{
        error::{ChipVisError, ChipVisResult},
        math::Fnv1a64,
    },
    output::sink::{FrameSink, SinkConfig},
    render::{frame::FrameRGBA, renderer::FrameRenderer},
};

/// Frame-level threading and chunking.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderThreading {
    /// Render the frames of a chunk on a rayon pool.
    pub parallel: bool,
    /// Frames per chunk; chunks are pushed to the sink in order.
    pub chunk_size: usize,
    /// Worker count; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Render identical samples of a chunk once and reuse the frame.
    pub static_frame_elision: bool,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            static_frame_elision: false,
        }
    }
}

/// Frame counts of one rendered sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames pushed to the sink.
    pub frames_total: u64,
    /// Frames actually rendered.
    pub frames_rendered: u64,
    /// Frames reused from an identical sample in the same chunk.
    pub frames_elided: u64,
}

impl RenderStats {
    fn add(&mut self, other: RenderStats) {
        self.frames_total += other.frames_total;
        self.frames_rendered += other.frames_rendered;
        self.frames_elided += other.frames_elided;
    }
}

/// Render every cycle of `seq` and push the frames to `sink` in cycle order.
#[tracing::instrument(skip_all, fields(mode = %seq.mode, cycles = seq.len()))]
pub fn render_sequence(
    renderer: &FrameRenderer,
    seq: &EncodedSequence,
    fps: u32,
    threading: &RenderThreading,
    sink: &mut dyn FrameSink,
) -> ChipVisResult<RenderStats> {
    let (width, height) = renderer.frame_size();
    sink.begin(SinkConfig { width, height, fps })?;

    let brightness = seq.mode.is_brightness();
    let chunk_size = threading.chunk_size.max(1);
    let pool = if threading.parallel {
        Some(build_thread_pool(threading.threads)?)
    } else {
        None
    };

    let mut stats = RenderStats::default();
    let mut next_idx = 0u64;
    for chunk in seq.cycles.chunks(chunk_size) {
        let (frames, chunk_stats) = render_chunk(
            renderer,
            chunk,
            brightness,
            threading.static_frame_elision,
            pool.as_ref(),
        )?;
        for frame in &frames {
            sink.push_frame(next_idx, frame)?;
            next_idx += 1;
        }
        stats.add(chunk_stats);
        tracing::debug!(done = next_idx, "chunk rendered");
    }

    sink.end()?;
    tracing::info!(
        frames = stats.frames_total,
        rendered = stats.frames_rendered,
        elided = stats.frames_elided,
        "mode rendered"
    );
    Ok(stats)
}

fn render_chunk(
    renderer: &FrameRenderer,
    samples: &[EncodedSample],
    brightness: bool,
    elide: bool,
    pool: Option<&rayon::ThreadPool>,
) -> ChipVisResult<(Vec<FrameRGBA>, RenderStats)> {
    let mut unique_indices = Vec::<usize>::with_capacity(samples.len());
    let mut frame_to_unique = Vec::<usize>::with_capacity(samples.len());
    if elide {
        let mut first = HashMap::<u64, usize>::new();
        for (idx, sample) in samples.iter().enumerate() {
            let fp = fingerprint(sample);
            match first.get(&fp).copied() {
                Some(slot) if samples[unique_indices[slot]] == *sample => {
                    frame_to_unique.push(slot);
                }
                _ => {
                    let slot = unique_indices.len();
                    unique_indices.push(idx);
                    first.entry(fp).or_insert(slot);
                    frame_to_unique.push(slot);
                }
            }
        }
    } else {
        for idx in 0..samples.len() {
            frame_to_unique.push(idx);
            unique_indices.push(idx);
        }
    }

    let render_one = |idx: &usize| renderer.render(&samples[*idx], brightness);
    let rendered: Vec<ChipVisResult<FrameRGBA>> = match pool {
        Some(pool) => pool.install(|| unique_indices.par_iter().map(render_one).collect()),
        None => unique_indices.iter().map(render_one).collect(),
    };
    let mut unique_frames = Vec::<Option<FrameRGBA>>::with_capacity(rendered.len());
    for item in rendered {
        unique_frames.push(Some(item?));
    }

    let mut remaining = vec![0usize; unique_frames.len()];
    for &u in &frame_to_unique {
        remaining[u] += 1;
    }

    let mut out = Vec::<FrameRGBA>::with_capacity(frame_to_unique.len());
    for u in frame_to_unique {
        let frame = if remaining[u] == 1 {
            unique_frames[u].take()
        } else {
            unique_frames[u].clone()
        };
        out.push(frame.ok_or_else(|| ChipVisError::render("internal error: unique frame missing"))?);
        remaining[u] -= 1;
    }

    let total = samples.len() as u64;
    let rendered_count = unique_indices.len() as u64;
    Ok((
        out,
        RenderStats {
            frames_total: total,
            frames_rendered: rendered_count,
            frames_elided: total.saturating_sub(rendered_count),
        },
    ))
}

fn fingerprint(sample: &EncodedSample) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_bytes(sample.label.as_bytes());
    h.write_bytes(&[0]);
    for v in &sample.values {
        h.write_u32(v.to_bits());
    }
    h.finish()
}

/// Build the frame pool. `threads` of `Some(0)` is rejected.
pub fn build_thread_pool(threads: Option<usize>) -> ChipVisResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ChipVisError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ChipVisError::render(format!("failed to build rayon thread pool: {e}")))
}
