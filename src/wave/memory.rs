use std::collections::BTreeMap;

use crate::{
    foundation::error::{ChipVisError, ChipVisResult},
    wave::{LogicLevel, LogicValue, Transition, WaveformSource},
};

/// A waveform held entirely in memory, keyed by full signal name.
#[derive(Clone, Debug, Default)]
pub struct MemoryWaveform {
    signals: BTreeMap<String, Vec<Transition>>,
}

impl MemoryWaveform {
    /// Create an empty waveform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a signal with no transitions yet.
    pub fn declare(&mut self, signal: impl Into<String>) {
        self.signals.entry(signal.into()).or_default();
    }

    /// Append a value change. Times must not decrease; a change at the same time as the last one
    /// replaces it.
    pub fn push(
        &mut self,
        signal: impl Into<String>,
        time: u64,
        value: LogicValue,
    ) -> ChipVisResult<()> {
        let signal = signal.into();
        let tv = self.signals.entry(signal.clone()).or_default();
        match tv.last_mut() {
            Some(last) if last.time > time => {
                return Err(ChipVisError::waveform(format!(
                    "signal '{signal}' goes back in time ({} -> {time})",
                    last.time
                )));
            }
            Some(last) if last.time == time => last.value = value,
            _ => tv.push(Transition { time, value }),
        }
        Ok(())
    }

    /// Builder-style scalar trace from `(time, level)` pairs given as `'0'|'1'|'x'|'z'`.
    pub fn with_scalar(mut self, signal: &str, changes: &[(u64, char)]) -> Self {
        for &(time, c) in changes {
            let level = LogicLevel::from_char(c).unwrap_or(LogicLevel::Unknown);
            // Test fixtures push in order; an out-of-order pair is dropped.
            let _ = self.push(signal, time, LogicValue::scalar(level));
        }
        self.declare(signal);
        self
    }

    /// Builder-style vector trace from `(time, "0101...")` pairs.
    pub fn with_vector(mut self, signal: &str, changes: &[(u64, &str)]) -> Self {
        for &(time, bits) in changes {
            if let Some(v) = LogicValue::parse(bits) {
                let _ = self.push(signal, time, v);
            }
        }
        self.declare(signal);
        self
    }

    /// Number of signals.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Whether no signal is declared.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

impl WaveformSource for MemoryWaveform {
    fn signal_names(&self) -> Vec<&str> {
        self.signals.keys().map(String::as_str).collect()
    }

    fn transitions(&self, signal: &str) -> Option<&[Transition]> {
        self.signals.get(signal).map(Vec::as_slice)
    }
}
