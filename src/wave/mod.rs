//! Waveform access and per-cycle sampling.
//!
//! The sampler only talks to [`WaveformSource`]; [`VcdWaveform`](vcd::VcdWaveform) and
//! [`MemoryWaveform`](memory::MemoryWaveform) are the two provided implementations.

use std::fmt;

/// Status-label decoding.
pub mod label;
/// In-memory waveform store.
pub mod memory;
/// Clock-edge sampling.
pub mod sampler;
/// VCD reader.
pub mod vcd;

/// One 4-state logic level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogicLevel {
    /// Logic 0.
    Zero,
    /// Logic 1.
    One,
    /// Unknown.
    Unknown,
    /// High impedance.
    HighZ,
}

impl LogicLevel {
    /// Parse one level character (`0`, `1`, `x`, `z`; case-insensitive).
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            '0' => Some(Self::Zero),
            '1' => Some(Self::One),
            'x' | 'u' | '-' => Some(Self::Unknown),
            'z' => Some(Self::HighZ),
            _ => None,
        }
    }

    /// 4-valued collapse: only `One` reads as high.
    pub fn collapse(self) -> bool {
        matches!(self, Self::One)
    }

    /// Level character.
    pub fn as_char(self) -> char {
        match self {
            Self::Zero => '0',
            Self::One => '1',
            Self::Unknown => 'x',
            Self::HighZ => 'z',
        }
    }
}

/// A scalar or vector value; levels are stored MSB first.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LogicValue(Vec<LogicLevel>);

impl LogicValue {
    /// Single-bit value.
    pub fn scalar(level: LogicLevel) -> Self {
        Self(vec![level])
    }

    /// Vector value from MSB-first levels.
    pub fn from_levels(levels: Vec<LogicLevel>) -> Self {
        Self(levels)
    }

    /// Parse an MSB-first level string such as `"01xz"`.
    pub fn parse(s: &str) -> Option<Self> {
        s.chars()
            .map(LogicLevel::from_char)
            .collect::<Option<Vec<_>>>()
            .filter(|v| !v.is_empty())
            .map(Self)
    }

    /// MSB-first levels.
    pub fn levels(&self) -> &[LogicLevel] {
        &self.0
    }

    /// Least significant level; the one sampled when a vector is read as a single net.
    pub fn lsb(&self) -> LogicLevel {
        self.0.last().copied().unwrap_or(LogicLevel::Unknown)
    }

    /// Whether every level is `Zero`.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|l| *l == LogicLevel::Zero)
    }

    /// Whether every level is `One`.
    pub fn is_one(&self) -> bool {
        self.0.iter().all(|l| *l == LogicLevel::One)
    }
}

impl fmt::Display for LogicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for l in &self.0 {
            write!(f, "{}", l.as_char())?;
        }
        Ok(())
    }
}

/// A value change at `time`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Simulation time in dump ticks.
    pub time: u64,
    /// Value from `time` on.
    pub value: LogicValue,
}

/// Read-only access to a fully loaded waveform.
pub trait WaveformSource {
    /// Every fully qualified signal name, in a stable order.
    fn signal_names(&self) -> Vec<&str>;

    /// Transitions of `signal` in increasing time order, or `None` for unknown signals.
    fn transitions(&self, signal: &str) -> Option<&[Transition]>;

    /// Value of `signal` at `time`: the last transition at or before `time`.
    fn value_at(&self, signal: &str, time: u64) -> Option<&LogicValue> {
        let tv = self.transitions(signal)?;
        let idx = tv.partition_point(|t| t.time <= time);
        idx.checked_sub(1).map(|i| &tv[i].value)
    }

    /// Whether `signal` exists.
    fn contains(&self, signal: &str) -> bool {
        self.transitions(signal).is_some()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/wave/sampler.rs"]
mod tests;
