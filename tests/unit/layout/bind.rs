use std::sync::Arc;

use super::{
    bind::{BoundLayout, NetSlot},
    placed::PlacedLayout,
};
use crate::{
    config::VisConfig,
    foundation::{core::Rect, error::ChipVisError, ids::NetName},
    netlist::{graph::ConnectivityGraph, resolve::OutputNetIndex, yosys::YosysDesign},
};

fn cfg() -> VisConfig {
    VisConfig {
        status_signal: "tb.status".to_string(),
        clock_signal: "clk".to_string(),
        ..VisConfig::default()
    }
    .validated()
    .unwrap()
}

fn outputs() -> OutputNetIndex {
    let doc = serde_json::json!({
        "creator": "test",
        "modules": { "top": {
            "ports": {},
            "netnames": {
                "n1": { "hide_name": 0, "bits": [11] },
                "n1_alias": { "hide_name": 0, "bits": [11] },
                "n2": { "hide_name": 0, "bits": [12] },
                "n3": { "hide_name": 0, "bits": [13] }
            },
            "cells": {
                "_1_": {
                    "type": "inv",
                    "port_directions": { "A": "input", "Y": "output" },
                    "connections": { "A": [2], "Y": [11] }
                },
                "_2_": {
                    "type": "inv",
                    "port_directions": { "A": "input", "Y": "output" },
                    "connections": { "A": [2], "Y": [12] }
                },
                "_3_": {
                    "type": "inv",
                    "port_directions": { "A": "input", "Y": "output" },
                    "connections": { "A": [2], "Y": [13] }
                }
            }
        } }
    });
    let design: YosysDesign = serde_json::from_value(doc).unwrap();
    OutputNetIndex::resolve(&ConnectivityGraph::from_yosys(&design, &cfg()).unwrap()).unwrap()
}

fn layout() -> PlacedLayout {
    PlacedLayout::from_json_str(
        r#"{
            "top": "top",
            "bbox": { "x0": 0.0, "y0": 0.0, "x1": 20.0, "y1": 10.0 },
            "instances": [
                { "name": "_1_", "cell_type": "inv", "bbox": { "x0": 2.0, "y0": 2.0, "x1": 4.0, "y1": 4.0 } },
                { "name": "_2_", "cell_type": "inv", "bbox": { "x0": 4.0, "y0": 2.0, "x1": 6.0, "y1": 4.0 } },
                { "name": "_3_", "cell_type": "inv", "bbox": { "x0": 6.0, "y0": 2.0, "x1": 8.0, "y1": 4.0 } },
                { "name": "_9_", "cell_type": "inv", "bbox": { "x0": 8.0, "y0": 2.0, "x1": 9.0, "y1": 4.0 } },
                { "name": "FILLER_0", "cell_type": "fill", "bbox": { "x0": 1.0, "y0": 1.0, "x1": 2.0, "y1": 2.0 } },
                { "name": "clkbuf_0", "cell_type": "buf", "bbox": { "x0": 9.0, "y0": 4.0, "x1": 12.0, "y1": 6.0 } }
            ]
        }"#,
    )
    .unwrap()
}

fn nets(names: &[&str]) -> Arc<[NetName]> {
    names.iter().map(|n| NetName::new(*n)).collect()
}

#[test]
fn real_cells_bind_to_sampled_columns() {
    let bound = BoundLayout::bind(&layout(), &outputs(), nets(&["n1_alias", "n2"]), &cfg()).unwrap();
    assert_eq!(bound.width, 20.0);
    assert_eq!(bound.height, 10.0);

    let slots: Vec<(&str, &NetSlot)> = bound
        .cells
        .iter()
        .map(|c| (c.name.as_str(), &c.slot))
        .collect();
    assert_eq!(
        slots,
        vec![
            ("_1_", &NetSlot::Sampled(0)),
            ("_2_", &NetSlot::Sampled(1)),
            ("_3_", &NetSlot::Unsampled(NetName::new("n3"))),
            ("_9_", &NetSlot::NoOutput),
        ]
    );
}

#[test]
fn active_region_covers_every_instance() {
    let bound = BoundLayout::bind(&layout(), &outputs(), nets(&[]), &cfg()).unwrap();
    assert_eq!(bound.active_region, Some(Rect::new(1.0, 1.0, 12.0, 6.0)));
}

#[test]
fn bbox_off_origin_is_rejected() {
    let mut l = layout();
    l.bbox = Rect::new(1.0, 0.0, 20.0, 10.0);
    let err = BoundLayout::bind(&l, &outputs(), nets(&[]), &cfg()).unwrap_err();
    assert!(matches!(err, ChipVisError::Layout(_)));
}

#[test]
fn sampled_net_outside_output_universe_is_rejected() {
    let err = BoundLayout::bind(&layout(), &outputs(), nets(&["n1", "bogus"]), &cfg()).unwrap_err();
    assert!(matches!(err, ChipVisError::Render(_)));
}

#[test]
fn layout_json_requires_instances() {
    assert!(PlacedLayout::from_json_str(r#"{ "bbox": { "x0": 0, "y0": 0, "x1": 1, "y1": 1 } }"#).is_err());
}
