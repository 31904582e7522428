use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::Arc,
};

use crate::{
    config::VisConfig,
    foundation::{
        core::{Palette, Rect},
        error::{ChipVisError, ChipVisResult},
        ids::{InstanceName, NetName},
    },
    layout::placed::PlacedLayout,
    netlist::{
        classify::{CellClassifier, CellKind},
        resolve::OutputNetIndex,
    },
};

/// Where a real cell reads its value from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetSlot {
    /// The instance drives no resolved output net; always rendered off.
    NoOutput,
    /// The instance drives `NetName`, but that net was not sampled; always rendered off.
    Unsampled(NetName),
    /// Column of the sampled net in the encoded sequences.
    Sampled(usize),
}

/// A real cell ready for painting.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundCell {
    /// Instance name.
    pub name: InstanceName,
    /// Placed box in layout units.
    pub bbox: Rect,
    /// Value source.
    pub slot: NetSlot,
}

/// Immutable render geometry for a run.
#[derive(Clone, Debug)]
pub struct BoundLayout {
    /// Layout width in layout units.
    pub width: f64,
    /// Layout height in layout units.
    pub height: f64,
    /// Union of every placed instance; `None` for an empty placement.
    pub active_region: Option<Rect>,
    /// Real cells in placement order.
    pub cells: Vec<BoundCell>,
    /// Net columns the cells refer to.
    pub nets: Arc<[NetName]>,
    /// Colors.
    pub palette: Palette,
}

impl BoundLayout {
    /// Bind placed instances to the sampled nets.
    ///
    /// `nets` are the net columns of the sample sequence; each must be an output net of
    /// `outputs`. A real cell reads the first of its driven nets that was sampled.
    #[tracing::instrument(skip_all)]
    pub fn bind(
        layout: &PlacedLayout,
        outputs: &OutputNetIndex,
        nets: Arc<[NetName]>,
        cfg: &VisConfig,
    ) -> ChipVisResult<Self> {
        let bbox = layout.bbox;
        if bbox.x0 != 0.0 || bbox.y0 != 0.0 {
            return Err(ChipVisError::layout(format!(
                "top cell bounding box must start at the origin, got ({}, {})",
                bbox.x0, bbox.y0
            )));
        }
        if !(bbox.x1.is_finite() && bbox.y1.is_finite() && bbox.x1 > 0.0 && bbox.y1 > 0.0) {
            return Err(ChipVisError::layout(format!(
                "top cell bounding box must have a positive finite size, got {}x{}",
                bbox.x1, bbox.y1
            )));
        }

        if let Some(unknown) = nets.iter().find(|n| !outputs.is_output_net(n.as_str())) {
            return Err(ChipVisError::render(format!(
                "sampled net '{unknown}' is not an output net of the design"
            )));
        }
        let column: HashMap<&str, usize> = nets
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();

        let classifier = CellClassifier::from_config(cfg);
        let mut by_kind: BTreeMap<CellKind, (usize, BTreeSet<&str>)> = BTreeMap::new();
        let mut active_region: Option<Rect> = None;
        let mut cells = Vec::new();
        let mut warned: BTreeSet<NetName> = BTreeSet::new();
        let mut no_output = 0usize;

        for inst in &layout.instances {
            let kind = classifier.classify(inst.name.as_str());
            let entry = by_kind.entry(kind).or_default();
            entry.0 += 1;
            entry.1.insert(inst.cell_type.as_str());

            let b = inst.bbox.abs();
            active_region = Some(match active_region {
                Some(r) => r.union(b),
                None => b,
            });

            if kind != CellKind::Real {
                continue;
            }
            let driven = outputs.outputs_of(inst.name.as_str()).unwrap_or(&[]);
            let slot = match driven.iter().find_map(|n| column.get(n.as_str())) {
                Some(&idx) => NetSlot::Sampled(idx),
                None => match driven.first() {
                    Some(net) => {
                        if warned.insert(net.clone()) {
                            tracing::warn!(net = %net, "net not found in waveform, rendering off");
                        }
                        NetSlot::Unsampled(net.clone())
                    }
                    None => {
                        tracing::debug!(instance = %inst.name, "instance drives no output net");
                        no_output += 1;
                        NetSlot::NoOutput
                    }
                },
            };
            cells.push(BoundCell {
                name: inst.name.clone(),
                bbox: b,
                slot,
            });
        }

        for (kind, (count, types)) in &by_kind {
            tracing::info!(?kind, count, ?types, "layout instances");
        }
        tracing::info!(
            real = cells.len(),
            unsampled_nets = warned.len(),
            without_output = no_output,
            "bound layout"
        );

        Ok(Self {
            width: bbox.x1,
            height: bbox.y1,
            active_region,
            cells,
            nets,
            palette: Palette::default(),
        })
    }
}
