use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::Context as _;

use crate::{
    foundation::error::{ChipVisError, ChipVisResult},
    wave::{LogicLevel, LogicValue, Transition, WaveformSource, memory::MemoryWaveform},
};

/// A VCD dump loaded fully into memory.
///
/// Signals are named `scope.scope.reference[index]`. Several declarations sharing one identifier
/// code each receive every change of that code.
#[derive(Clone, Debug, Default)]
pub struct VcdWaveform {
    store: MemoryWaveform,
    timescale: Option<String>,
}

impl VcdWaveform {
    /// Read a VCD file.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn from_path(path: &Path) -> ChipVisResult<Self> {
        let f = File::open(path).with_context(|| format!("open VCD '{}'", path.display()))?;
        let wave = Self::from_reader(BufReader::new(f))?;
        tracing::info!(signals = wave.store.len(), "VCD loaded");
        Ok(wave)
    }

    /// Read a VCD document from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> ChipVisResult<Self> {
        let mut parser = vcd::Parser::new(reader);
        let header = parser
            .parse_header()
            .map_err(|e| ChipVisError::waveform(format!("VCD header: {e}")))?;

        let mut names = Vec::new();
        let mut by_code: HashMap<vcd::IdCode, Vec<usize>> = HashMap::new();
        collect_vars(&header.items, &mut Vec::new(), &mut names, &mut by_code);

        let mut store = MemoryWaveform::new();
        for name in &names {
            store.declare(name.as_str());
        }

        let mut time = 0u64;
        for cmd in parser {
            let cmd = cmd.map_err(|e| ChipVisError::waveform(format!("VCD body: {e}")))?;
            let (code, value) = match cmd {
                vcd::Command::Timestamp(t) => {
                    time = t;
                    continue;
                }
                vcd::Command::ChangeScalar(code, v) => (code, LogicValue::scalar(level_of(v))),
                vcd::Command::ChangeVector(code, v) => {
                    let text = v.to_string();
                    let Some(value) = LogicValue::parse(&text) else {
                        return Err(ChipVisError::waveform(format!(
                            "unsupported vector value '{text}' at time {time}"
                        )));
                    };
                    (code, value)
                }
                _ => continue,
            };
            let Some(targets) = by_code.get(&code) else {
                tracing::debug!(%code, time, "change for undeclared identifier code");
                continue;
            };
            for &idx in targets {
                store.push(names[idx].as_str(), time, value.clone())?;
            }
        }

        let timescale = header
            .timescale
            .map(|(n, unit)| format!("{n} {unit}"));
        Ok(Self { store, timescale })
    }

    /// Declared timescale, e.g. `"1 ps"`.
    pub fn timescale(&self) -> Option<&str> {
        self.timescale.as_deref()
    }
}

impl WaveformSource for VcdWaveform {
    fn signal_names(&self) -> Vec<&str> {
        self.store.signal_names()
    }

    fn transitions(&self, signal: &str) -> Option<&[Transition]> {
        self.store.transitions(signal)
    }
}

fn level_of(v: vcd::Value) -> LogicLevel {
    match v {
        vcd::Value::V0 => LogicLevel::Zero,
        vcd::Value::V1 => LogicLevel::One,
        vcd::Value::Z => LogicLevel::HighZ,
        _ => LogicLevel::Unknown,
    }
}

fn collect_vars(
    items: &[vcd::ScopeItem],
    path: &mut Vec<String>,
    names: &mut Vec<String>,
    by_code: &mut HashMap<vcd::IdCode, Vec<usize>>,
) {
    for item in items {
        match item {
            vcd::ScopeItem::Scope(scope) => {
                path.push(scope.identifier.clone());
                collect_vars(&scope.items, path, names, by_code);
                path.pop();
            }
            vcd::ScopeItem::Var(var) => {
                let mut name = path.join(".");
                if !name.is_empty() {
                    name.push('.');
                }
                name.push_str(&var.reference);
                match var.index {
                    Some(vcd::ReferenceIndex::BitSelect(i)) => name.push_str(&format!("[{i}]")),
                    Some(vcd::ReferenceIndex::Range(msb, lsb)) => {
                        name.push_str(&format!("[{msb}:{lsb}]"))
                    }
                    None => {}
                }
                by_code.entry(var.code).or_default().push(names.len());
                names.push(name);
            }
            _ => {}
        }
    }
}
