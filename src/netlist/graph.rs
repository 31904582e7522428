use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{
    config::VisConfig,
    foundation::{
        error::{ChipVisError, ChipVisResult},
        ids::{InstanceName, NetName},
    },
    netlist::{
        classify::{CellClassifier, CellKind},
        yosys::{BitRef, PortDirection, YosysDesign},
    },
};

/// One pin connection of a real cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PinConnection {
    /// Pin name on the cell.
    pub pin: String,
    /// Bit bound to the pin.
    pub bit: BitRef,
}

/// A classified cell instance of the top module.
#[derive(Clone, Debug)]
pub struct CellRecord {
    /// Library cell type.
    pub cell_type: String,
    /// Role of the instance.
    pub kind: CellKind,
    /// Input pins (real cells only).
    pub inputs: Vec<PinConnection>,
    /// Output pins (real cells only).
    pub outputs: Vec<PinConnection>,
}

/// Connectivity of the single top-level design module.
#[derive(Clone, Debug)]
pub struct ConnectivityGraph {
    /// Top module name.
    pub top: String,
    /// Port name -> direction, ignored ports excluded.
    pub ports: BTreeMap<String, PortDirection>,
    /// Cells keyed by instance name.
    pub cells: BTreeMap<InstanceName, CellRecord>,
    bit_aliases: HashMap<BitRef, Vec<NetName>>,
    net_count: usize,
}

impl ConnectivityGraph {
    /// Select the top module of `design` and classify its cells.
    ///
    /// Fails unless exactly one non-library module exists, or when a real cell's connections do
    /// not match its declared pins one-to-one.
    #[tracing::instrument(skip_all)]
    pub fn from_yosys(design: &YosysDesign, cfg: &VisConfig) -> ChipVisResult<Self> {
        tracing::info!(creator = %design.creator, "reading design");

        let design_modules: Vec<_> = design
            .modules
            .iter()
            .filter(|(name, m)| {
                !m.is_blackbox()
                    && !cfg
                        .library_prefixes
                        .iter()
                        .any(|p| name.starts_with(p.as_str()))
            })
            .collect();
        let names: Vec<&str> = design_modules.iter().map(|(n, _)| n.as_str()).collect();
        tracing::info!(?names, "design modules");
        let [(top_name, top)] = design_modules.as_slice() else {
            return Err(ChipVisError::netlist(format!(
                "expected exactly one non-library module, found {} ({})",
                names.len(),
                names.join(", ")
            )));
        };

        let ports: BTreeMap<String, PortDirection> = top
            .ports
            .iter()
            .filter(|(name, _)| !cfg.is_ignored_port(name))
            .map(|(name, p)| (name.clone(), p.direction))
            .collect();
        log_names("top ports", ports.keys());

        let mut bit_aliases: HashMap<BitRef, Vec<NetName>> = HashMap::new();
        let mut net_count = 0usize;
        for (name, entry) in &top.netnames {
            if cfg.is_ignored_port(name) {
                continue;
            }
            let width = entry.bits.len();
            for (i, bit) in entry.bits.iter().enumerate() {
                bit_aliases
                    .entry(bit.clone())
                    .or_default()
                    .push(NetName::for_bit(name, i, width));
                net_count += 1;
            }
        }
        log_names("top nets", top.netnames.keys());

        let classifier = CellClassifier::from_config(cfg);
        let mut cells = BTreeMap::new();
        for (name, cell) in &top.cells {
            let kind = classifier.classify(name);
            let record = if kind == CellKind::Real {
                let (inputs, outputs) = split_real_pins(name, cell, cfg)?;
                CellRecord {
                    cell_type: cell.cell_type.clone(),
                    kind,
                    inputs,
                    outputs,
                }
            } else {
                if cell.port_directions.len() != cell.connections.len() {
                    return Err(ChipVisError::netlist(format!(
                        "cell '{name}' declares {} pins but connects {}",
                        cell.port_directions.len(),
                        cell.connections.len()
                    )));
                }
                CellRecord {
                    cell_type: cell.cell_type.clone(),
                    kind,
                    inputs: Vec::new(),
                    outputs: Vec::new(),
                }
            };
            cells.insert(InstanceName::new(name.as_str()), record);
        }

        let graph = Self {
            top: (*top_name).clone(),
            ports,
            cells,
            bit_aliases,
            net_count,
        };
        tracing::info!(
            physical_types = ?graph.cell_types(|k| k != CellKind::Real),
            "physical cell types"
        );
        tracing::info!(
            real_types = ?graph.cell_types(|k| k == CellKind::Real),
            "real cell types"
        );
        Ok(graph)
    }

    /// Every net name aliasing `bit`. Empty for constants and unnamed bits.
    pub fn aliases(&self, bit: &BitRef) -> &[NetName] {
        self.bit_aliases.get(bit).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of (name, bit) entries in the net-name table.
    pub fn net_count(&self) -> usize {
        self.net_count
    }

    /// Iterate over real cells.
    pub fn real_cells(&self) -> impl Iterator<Item = (&InstanceName, &CellRecord)> {
        self.cells.iter().filter(|(_, c)| c.kind == CellKind::Real)
    }

    fn cell_types(&self, pred: impl Fn(CellKind) -> bool) -> BTreeSet<&str> {
        self.cells
            .values()
            .filter(|c| pred(c.kind))
            .map(|c| c.cell_type.as_str())
            .collect()
    }
}

fn split_real_pins(
    name: &str,
    cell: &crate::netlist::yosys::YosysCell,
    cfg: &VisConfig,
) -> ChipVisResult<(Vec<PinConnection>, Vec<PinConnection>)> {
    let declared: BTreeSet<&String> = cell.port_directions.keys().collect();
    let connected: BTreeSet<&String> = cell.connections.keys().collect();
    if declared != connected {
        return Err(ChipVisError::netlist(format!(
            "cell '{name}' ({}) pin set does not match its connections",
            cell.cell_type
        )));
    }

    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    for (pin, bits) in &cell.connections {
        if cfg.is_ignored_port(pin) {
            continue;
        }
        let [bit] = bits.as_slice() else {
            return Err(ChipVisError::netlist(format!(
                "cell '{name}' pin '{pin}' is {} bits wide, expected 1",
                bits.len()
            )));
        };
        let conn = PinConnection {
            pin: pin.clone(),
            bit: bit.clone(),
        };
        match cell.port_directions.get(pin) {
            Some(PortDirection::Input) => inputs.push(conn),
            Some(PortDirection::Output) => outputs.push(conn),
            Some(PortDirection::Inout) | None => {
                return Err(ChipVisError::netlist(format!(
                    "cell '{name}' pin '{pin}' must be an input or an output"
                )));
            }
        }
    }
    Ok((inputs, outputs))
}

fn log_names<'a>(what: &str, names: impl Iterator<Item = &'a String>) {
    let mut names: Vec<&String> = names.collect();
    names.sort();
    let total = names.len();
    names.truncate(20);
    if total > 20 {
        tracing::info!(?names, total, "{what} (first 20)");
    } else {
        tracing::info!(?names, "{what}");
    }
}
