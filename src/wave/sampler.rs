use std::collections::BTreeMap;

use crate::{
    activity::sample::{Sample, SampleSequence},
    config::VisConfig,
    foundation::{
        error::{ChipVisError, ChipVisResult},
        ids::{NetName, SignalPath},
    },
    netlist::resolve::OutputNetIndex,
    wave::{LogicLevel, LogicValue, WaveformSource, label::decode_status},
};

/// One clock cycle: from a rising edge up to (excluding) the next one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleInterval {
    /// Time of the opening rising edge.
    pub start: u64,
    /// Time of the closing rising edge.
    pub end: u64,
}

impl CycleInterval {
    /// Sampling instant: the last tick before the closing edge.
    pub fn sample_time(&self) -> u64 {
        self.end.saturating_sub(1)
    }
}

/// Samples a waveform at clock edges.
pub struct WaveformSampler<'a, W: WaveformSource + ?Sized> {
    wave: &'a W,
    cfg: &'a VisConfig,
}

impl<'a, W: WaveformSource + ?Sized> WaveformSampler<'a, W> {
    /// Sampler over `wave` using the signal names of `cfg`.
    pub fn new(wave: &'a W, cfg: &'a VisConfig) -> Self {
        Self { wave, cfg }
    }

    /// Look up a design signal by its exact name, then under the design prefix.
    pub fn resolve_signal(&self, name: &str) -> ChipVisResult<String> {
        if self.wave.contains(name) {
            return Ok(name.to_string());
        }
        let scoped = format!("{}{name}", self.cfg.prefix);
        if self.wave.contains(&scoped) {
            return Ok(scoped);
        }
        Err(ChipVisError::waveform(format!(
            "signal '{name}' not found (also tried '{scoped}')"
        )))
    }

    /// Full name of the status signal: an exact match, else the only signal starting with the
    /// configured name.
    pub fn status_signal(&self) -> ChipVisResult<String> {
        let wanted = self.cfg.status_signal.as_str();
        if self.wave.contains(wanted) {
            return Ok(wanted.to_string());
        }
        let matches: Vec<&str> = self
            .wave
            .signal_names()
            .into_iter()
            .filter(|n| n.starts_with(wanted))
            .collect();
        match matches.as_slice() {
            [only] => Ok((*only).to_string()),
            [] => Err(ChipVisError::waveform(format!(
                "status signal '{wanted}' not found"
            ))),
            many => Err(ChipVisError::waveform(format!(
                "status signal '{wanted}' is ambiguous ({} candidates)",
                many.len()
            ))),
        }
    }

    /// Time of the last reset transition, which must be to logic-0. Zero without a reset signal.
    pub fn reset_release_time(&self) -> ChipVisResult<u64> {
        let Some(reset) = self.cfg.reset_signal.as_deref() else {
            return Ok(0);
        };
        let signal = self.resolve_signal(reset)?;
        let last = self
            .wave
            .transitions(&signal)
            .and_then(|tv| tv.last())
            .ok_or_else(|| ChipVisError::ResetNotReleased {
                signal: reset.to_string(),
                last: "none".to_string(),
            })?;
        if !last.value.is_zero() {
            return Err(ChipVisError::ResetNotReleased {
                signal: reset.to_string(),
                last: last.value.to_string(),
            });
        }
        Ok(last.time)
    }

    /// Intervals between successive rising clock edges at or after `from`.
    pub fn clock_intervals(&self, from: u64) -> ChipVisResult<Vec<CycleInterval>> {
        let clock = self.resolve_signal(&self.cfg.clock_signal)?;
        let tv = self.wave.transitions(&clock).unwrap_or(&[]);

        let mut out = Vec::new();
        let mut open: Option<u64> = None;
        for t in tv.iter().filter(|t| t.time >= from) {
            if t.value.lsb() == LogicLevel::One {
                if let Some(start) = open {
                    out.push(CycleInterval { start, end: t.time });
                }
                open = Some(t.time);
            }
        }
        Ok(out)
    }

    /// Output nets present in the waveform, with the waveform signal each is read from.
    pub fn nets_of_interest(&self, outputs: &OutputNetIndex) -> BTreeMap<NetName, String> {
        let mut internal: BTreeMap<NetName, String> = BTreeMap::new();
        for name in self.wave.signal_names() {
            if let Some(net) = SignalPath::new(name).to_net_name(&self.cfg.prefix) {
                internal.entry(net).or_insert_with(|| name.to_string());
            }
        }
        let internal_count = internal.len();
        internal.retain(|net, _| outputs.is_output_net(net.as_str()));

        let total = outputs.output_net_count();
        tracing::info!(
            matching = internal.len(),
            internal_signals = internal_count,
            output_nets = total,
            "matched waveform signals to output nets"
        );
        tracing::info!(
            unmatched = total - internal.len(),
            "output nets without a waveform signal"
        );
        internal
    }

    /// Sample every net of interest at each clock cycle after reset, then trim to the first
    /// cycle whose status contains the start marker.
    #[tracing::instrument(skip_all)]
    pub fn sample(&self, outputs: &OutputNetIndex) -> ChipVisResult<SampleSequence> {
        let status = self.status_signal()?;
        let start = self.reset_release_time()?;
        tracing::info!(start, "reset released");

        let intervals = self.clock_intervals(start)?;
        let nets = self.nets_of_interest(outputs);
        let (names, signals): (Vec<NetName>, Vec<String>) = nets.into_iter().unzip();

        let mut seq = SampleSequence::new(names);
        let mut last_label = String::new();
        for iv in &intervals {
            let at = iv.sample_time();
            let values = signals
                .iter()
                .map(|s| {
                    self.wave
                        .value_at(s, at)
                        .is_some_and(|v| v.lsb().collapse())
                })
                .collect();
            let label = match self.wave.value_at(&status, at) {
                Some(v) => decode_status(v),
                None => decode_status(&LogicValue::scalar(LogicLevel::Zero)),
            };
            if label != last_label {
                tracing::info!(status = %label, time = at, "status");
                last_label.clone_from(&label);
            }
            seq.cycles.push(Sample { label, values });
        }
        tracing::info!(cycles = seq.len(), "clock cycles after reset");

        let marker = self.cfg.start_status.as_str();
        let first = seq
            .cycles
            .iter()
            .position(|s| s.label.contains(marker))
            .ok_or_else(|| ChipVisError::StartStatusNotFound {
                marker: marker.to_string(),
            })?;
        seq.trim_front(first);
        tracing::info!(cycles = seq.len(), "clock cycles after start status");
        Ok(seq)
    }
}
