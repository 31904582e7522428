use std::collections::{BTreeMap, BTreeSet};

use crate::{
    foundation::{
        error::{ChipVisError, ChipVisResult},
        ids::{InstanceName, NetName},
    },
    netlist::graph::ConnectivityGraph,
};

/// Mapping between real cells and the nets they drive.
///
/// Built once from a [`ConnectivityGraph`]; every net in [`OutputNetIndex::output_nets`] has
/// exactly one driving real cell.
#[derive(Clone, Debug, Default)]
pub struct OutputNetIndex {
    cell_outputs: BTreeMap<InstanceName, Vec<NetName>>,
    net_driver: BTreeMap<NetName, InstanceName>,
}

impl OutputNetIndex {
    /// Resolve every real cell's output bits to net names and build the inverse index.
    ///
    /// Fails with [`ChipVisError::AmbiguousDriver`] when a net resolves to more than one real
    /// cell.
    #[tracing::instrument(skip_all)]
    pub fn resolve(graph: &ConnectivityGraph) -> ChipVisResult<Self> {
        tracing::info!("matching nets to cells");
        let mut cell_outputs = BTreeMap::new();
        let mut drivers: BTreeMap<NetName, Vec<InstanceName>> = BTreeMap::new();

        for (name, cell) in graph.real_cells() {
            let mut nets = Vec::new();
            for out in &cell.outputs {
                nets.extend(graph.aliases(&out.bit).iter().cloned());
            }
            for net in &nets {
                drivers.entry(net.clone()).or_default().push(name.clone());
            }
            cell_outputs.insert(name.clone(), nets);
        }

        let mut net_driver = BTreeMap::new();
        for (net, cells) in drivers {
            let mut cells = cells;
            cells.dedup();
            match cells.as_slice() {
                [single] => {
                    net_driver.insert(net, single.clone());
                }
                _ => {
                    return Err(ChipVisError::AmbiguousDriver {
                        net: net.to_string(),
                        drivers: cells.iter().map(ToString::to_string).collect(),
                    });
                }
            }
        }

        tracing::info!(
            real_cells = cell_outputs.len(),
            output_nets = net_driver.len(),
            named_bits = graph.net_count(),
            "resolved output nets"
        );
        Ok(Self {
            cell_outputs,
            net_driver,
        })
    }

    /// Nets driven by a real cell, in pin order. `None` for unknown instances.
    pub fn outputs_of(&self, cell: &str) -> Option<&[NetName]> {
        self.cell_outputs.get(cell).map(Vec::as_slice)
    }

    /// The unique driver of `net`, if it is an output net.
    pub fn driver_of(&self, net: &str) -> Option<&InstanceName> {
        self.net_driver.get(net)
    }

    /// Whether `net` is in the output-net universe.
    pub fn is_output_net(&self, net: &str) -> bool {
        self.net_driver.contains_key(net)
    }

    /// All output nets, sorted.
    pub fn output_nets(&self) -> impl Iterator<Item = &NetName> {
        self.net_driver.keys()
    }

    /// Number of output nets.
    pub fn output_net_count(&self) -> usize {
        self.net_driver.len()
    }

    /// Output nets as an owned set.
    pub fn output_net_set(&self) -> BTreeSet<NetName> {
        self.net_driver.keys().cloned().collect()
    }
}
