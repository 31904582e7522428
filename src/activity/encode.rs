use std::sync::Arc;

use crate::{
    activity::{
        fold::{NetTransition, fold_per_net},
        mode::EncodingMode,
        sample::SampleSequence,
    },
    config::VisConfig,
    foundation::ids::NetName,
};

/// On when the value differs from the previous cycle.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeDetect;

impl NetTransition for EdgeDetect {
    type State = bool;

    fn initial(&self) -> bool {
        false
    }

    fn step(&self, _state: bool, changed: bool) -> bool {
        changed
    }

    fn render(&self, state: bool) -> f32 {
        if state { 1.0 } else { 0.0 }
    }
}

/// Brightness jumps to 1 on change and is multiplied by `decay` otherwise.
#[derive(Clone, Copy, Debug)]
pub struct ExpDecay {
    /// Per-cycle decay factor.
    pub decay: f32,
}

impl NetTransition for ExpDecay {
    type State = f32;

    fn initial(&self) -> f32 {
        0.0
    }

    fn step(&self, b: f32, changed: bool) -> f32 {
        if changed { 1.0 } else { b * self.decay }
    }

    fn render(&self, b: f32) -> f32 {
        b.clamp(0.0, 1.0)
    }
}

const HEAT_FLOOR: f32 = 0.5;
const HEAT_CEIL: f32 = 1.5;

/// Heat tracked in `[0.5, 1.5]`: multiplied by `grow` on change, by `decay` otherwise.
#[derive(Clone, Copy, Debug)]
pub struct ExpHeatmap {
    /// Growth factor applied on change.
    pub grow: f32,
    /// Decay factor applied otherwise.
    pub decay: f32,
}

impl NetTransition for ExpHeatmap {
    type State = f32;

    fn initial(&self) -> f32 {
        HEAT_FLOOR
    }

    fn step(&self, t: f32, changed: bool) -> f32 {
        let next = if changed {
            t * self.grow
        } else {
            t * self.decay
        };
        next.clamp(HEAT_FLOOR, HEAT_CEIL)
    }

    fn render(&self, t: f32) -> f32 {
        (t - HEAT_FLOOR).clamp(0.0, 1.0)
    }
}

/// Heat tracked in `[0.5, 1.5]`: increased by `grow` on change, decreased by `decay` otherwise.
#[derive(Clone, Copy, Debug)]
pub struct LinHeatmap {
    /// Step added on change.
    pub grow: f32,
    /// Step subtracted otherwise.
    pub decay: f32,
}

impl NetTransition for LinHeatmap {
    type State = f32;

    fn initial(&self) -> f32 {
        HEAT_FLOOR
    }

    fn step(&self, t: f32, changed: bool) -> f32 {
        if changed {
            (t + self.grow).min(HEAT_CEIL)
        } else {
            (t - self.decay).max(HEAT_FLOOR)
        }
    }

    fn render(&self, t: f32) -> f32 {
        (t - HEAT_FLOOR).clamp(0.0, 1.0)
    }
}

/// Value of every net at one cycle under one encoding.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedSample {
    /// Status label, unchanged from the raw sample.
    pub label: String,
    /// Per-net value in `[0, 1]`, aligned with [`EncodedSequence::nets`].
    pub values: Vec<f32>,
}

/// One encoding of a [`SampleSequence`], aligned cycle for cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedSequence {
    /// Encoding that produced the values.
    pub mode: EncodingMode,
    /// Nets, shared with the source sequence.
    pub nets: Arc<[NetName]>,
    /// Encoded cycles.
    pub cycles: Vec<EncodedSample>,
}

impl EncodedSequence {
    fn from_rows(mode: EncodingMode, seq: &SampleSequence, rows: Vec<Vec<f32>>) -> Self {
        let cycles = seq
            .cycles
            .iter()
            .zip(rows)
            .map(|(s, values)| EncodedSample {
                label: s.label.clone(),
                values,
            })
            .collect();
        Self {
            mode,
            nets: Arc::clone(&seq.nets),
            cycles,
        }
    }

    /// Number of cycles.
    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    /// Whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    /// Value of `net` at `cycle`.
    pub fn value_of(&self, cycle: usize, net: &str) -> Option<f32> {
        let idx = self.nets.iter().position(|n| n.as_str() == net)?;
        self.cycles.get(cycle).map(|s| s.values[idx])
    }
}

fn bit(v: bool) -> f32 {
    if v { 1.0 } else { 0.0 }
}

/// Mode 0: the raw values.
pub fn encode_direct(seq: &SampleSequence) -> EncodedSequence {
    let rows = seq
        .cycles
        .iter()
        .map(|s| s.values.iter().copied().map(bit).collect())
        .collect();
    EncodedSequence::from_rows(EncodingMode::Direct, seq, rows)
}

/// Mode 1: raw values, with nets that hold one value over the whole sequence forced to 0.
pub fn encode_direct_filtered(seq: &SampleSequence) -> EncodedSequence {
    let width = seq.nets.len();
    let constant: Vec<bool> = (0..width)
        .map(|i| match seq.cycles.first() {
            Some(first) => seq.cycles.iter().all(|s| s.values[i] == first.values[i]),
            None => true,
        })
        .collect();
    let rows = seq
        .cycles
        .iter()
        .map(|s| {
            s.values
                .iter()
                .zip(&constant)
                .map(|(&v, &c)| if c { 0.0 } else { bit(v) })
                .collect()
        })
        .collect();
    EncodedSequence::from_rows(EncodingMode::DirectFiltered, seq, rows)
}

/// Modes 2-5 through their per-net transition.
pub fn encode_with<T: NetTransition>(
    mode: EncodingMode,
    transition: &T,
    seq: &SampleSequence,
) -> EncodedSequence {
    EncodedSequence::from_rows(mode, seq, fold_per_net(transition, seq))
}

/// Produces any of the six encodings with factors taken from the configuration.
#[derive(Clone, Copy, Debug)]
pub struct Encoder {
    exp_decay: ExpDecay,
    exp_heatmap: ExpHeatmap,
    lin_heatmap: LinHeatmap,
}

impl Encoder {
    /// Encoder using the (already normalized) factors of `cfg`.
    pub fn new(cfg: &VisConfig) -> Self {
        Self {
            exp_decay: ExpDecay {
                decay: cfg.exp_decay,
            },
            exp_heatmap: ExpHeatmap {
                grow: cfg.exp_grow,
                decay: cfg.exp_decay,
            },
            lin_heatmap: LinHeatmap {
                grow: cfg.lin_grow,
                decay: cfg.lin_decay,
            },
        }
    }

    /// Encode `seq` under `mode`.
    pub fn encode(&self, mode: EncodingMode, seq: &SampleSequence) -> EncodedSequence {
        match mode {
            EncodingMode::Direct => encode_direct(seq),
            EncodingMode::DirectFiltered => encode_direct_filtered(seq),
            EncodingMode::Edge => encode_with(mode, &EdgeDetect, seq),
            EncodingMode::ExpDecay => encode_with(mode, &self.exp_decay, seq),
            EncodingMode::ExpHeatmap => encode_with(mode, &self.exp_heatmap, seq),
            EncodingMode::LinHeatmap => encode_with(mode, &self.lin_heatmap, seq),
        }
    }

    /// Encode `seq` under every mode in `modes`, in order.
    #[tracing::instrument(skip_all, fields(cycles = seq.len(), nets = seq.nets.len()))]
    pub fn encode_all(&self, modes: &[EncodingMode], seq: &SampleSequence) -> Vec<EncodedSequence> {
        modes
            .iter()
            .map(|&mode| {
                tracing::debug!(%mode, "encoding");
                self.encode(mode, seq)
            })
            .collect()
    }
}
