use super::{
    classify::{CellClassifier, CellKind},
    graph::ConnectivityGraph,
    resolve::OutputNetIndex,
    yosys::{BitRef, YosysDesign},
};
use crate::{config::VisConfig, foundation::error::ChipVisError};

fn cfg() -> VisConfig {
    VisConfig {
        prefix: "tb.uut.".to_string(),
        status_signal: "tb.status".to_string(),
        clock_signal: "clk".to_string(),
        ..VisConfig::default()
    }
    .validated()
    .unwrap()
}

fn design(cells: serde_json::Value) -> YosysDesign {
    let doc = serde_json::json!({
        "creator": "Yosys 0.38",
        "modules": {
            "sky130_fd_sc_hd__inv_1": {
                "ports": { "A": { "direction": "input", "bits": [2] } },
                "cells": {},
                "netnames": {}
            },
            "macro_bb": {
                "attributes": { "blackbox": "00000000000000000000000000000001" },
                "ports": {},
                "cells": {},
                "netnames": {}
            },
            "top": {
                "ports": {
                    "clk": { "direction": "input", "bits": [1] },
                    "a": { "direction": "input", "bits": [2] },
                    "y": { "direction": "output", "bits": [5] },
                    "VPWR": { "direction": "input", "bits": [10] }
                },
                "netnames": {
                    "clk": { "hide_name": 0, "bits": [1] },
                    "a": { "hide_name": 0, "bits": [2] },
                    "n3": { "hide_name": 0, "bits": [3] },
                    "alias_n3": { "hide_name": 0, "bits": [3] },
                    "b": { "hide_name": 0, "bits": [4] },
                    "y": { "hide_name": 0, "bits": [5] },
                    "clk_buf": { "hide_name": 0, "bits": [6] },
                    "bus": { "hide_name": 0, "bits": [7, 8] },
                    "VPWR": { "hide_name": 0, "bits": [10] },
                    "VGND": { "hide_name": 0, "bits": [11] }
                },
                "cells": cells
            }
        }
    });
    serde_json::from_value(doc).unwrap()
}

fn standard_cells() -> serde_json::Value {
    serde_json::json!({
        "_1_": {
            "type": "sky130_fd_sc_hd__inv_1",
            "port_directions": { "A": "input", "Y": "output", "VPWR": "input", "VGND": "input" },
            "connections": { "A": [2], "Y": [3], "VPWR": [10], "VGND": [11] }
        },
        "_2_": {
            "type": "sky130_fd_sc_hd__and2_1",
            "port_directions": { "A": "input", "B": "input", "X": "output" },
            "connections": { "A": [3], "B": [4], "X": [5] }
        },
        "_3_": {
            "type": "sky130_fd_sc_hd__dfxtp_1",
            "port_directions": { "CLK": "input", "D": "input", "Q": "output" },
            "connections": { "CLK": [6], "D": ["0"], "Q": [8] }
        },
        "FILLER_0_0": {
            "type": "sky130_fd_sc_hd__fill_1",
            "port_directions": { "VPWR": "input" },
            "connections": { "VPWR": [10] }
        },
        "clkbuf_0_clk": {
            "type": "sky130_fd_sc_hd__clkbuf_16",
            "port_directions": { "A": "input", "X": "output" },
            "connections": { "A": [1], "X": [6] }
        }
    })
}

#[test]
fn bits_deserialize_as_numbers_or_constants() {
    let bits: Vec<BitRef> = serde_json::from_str(r#"[3, "0", "x"]"#).unwrap();
    assert_eq!(
        bits,
        vec![
            BitRef::Net(3),
            BitRef::Const("0".to_string()),
            BitRef::Const("x".to_string())
        ]
    );
}

#[test]
fn library_and_blackbox_modules_are_skipped() {
    let g = ConnectivityGraph::from_yosys(&design(standard_cells()), &cfg()).unwrap();
    assert_eq!(g.top, "top");
    assert!(g.ports.contains_key("clk"));
    assert!(!g.ports.contains_key("VPWR"));
}

#[test]
fn two_design_modules_are_rejected() {
    let mut d = design(standard_cells());
    d.modules.insert("other_top".to_string(), Default::default());
    let err = ConnectivityGraph::from_yosys(&d, &cfg()).unwrap_err();
    assert!(matches!(err, ChipVisError::Netlist(_)));
}

#[test]
fn no_design_module_is_rejected() {
    let mut d = design(standard_cells());
    d.modules.remove("top");
    assert!(ConnectivityGraph::from_yosys(&d, &cfg()).is_err());
}

#[test]
fn partition_is_complete_and_disjoint() {
    let g = ConnectivityGraph::from_yosys(&design(standard_cells()), &cfg()).unwrap();
    let kinds: Vec<(String, CellKind)> = g
        .cells
        .iter()
        .map(|(n, c)| (n.to_string(), c.kind))
        .collect();
    assert_eq!(kinds.len(), 5);
    assert!(kinds.contains(&("FILLER_0_0".to_string(), CellKind::Filler)));
    assert!(kinds.contains(&("clkbuf_0_clk".to_string(), CellKind::Physical)));
    assert_eq!(
        kinds.iter().filter(|(_, k)| *k == CellKind::Real).count(),
        3
    );
}

#[test]
fn classifier_checks_filler_prefixes_first() {
    let c = CellClassifier::new(vec!["X_".to_string()], vec!["X_".to_string()]);
    assert_eq!(c.classify("X_1"), CellKind::Filler);
    assert_eq!(c.classify("Y_1"), CellKind::Real);
}

#[test]
fn real_cell_pin_mismatch_is_rejected() {
    let cells = serde_json::json!({
        "_1_": {
            "type": "inv",
            "port_directions": { "A": "input", "Y": "output" },
            "connections": { "A": [2] }
        }
    });
    let err = ConnectivityGraph::from_yosys(&design(cells), &cfg()).unwrap_err();
    assert!(err.to_string().contains("pin set"));
}

#[test]
fn multi_bit_pins_are_rejected() {
    let cells = serde_json::json!({
        "_1_": {
            "type": "inv",
            "port_directions": { "A": "input", "Y": "output" },
            "connections": { "A": [2, 4], "Y": [3] }
        }
    });
    assert!(ConnectivityGraph::from_yosys(&design(cells), &cfg()).is_err());
}

#[test]
fn aliases_resolve_to_all_names_of_a_bit() {
    let g = ConnectivityGraph::from_yosys(&design(standard_cells()), &cfg()).unwrap();
    let idx = OutputNetIndex::resolve(&g).unwrap();

    let outs: Vec<&str> = idx
        .outputs_of("_1_")
        .unwrap()
        .iter()
        .map(|n| n.as_str())
        .collect();
    assert_eq!(outs, vec!["alias_n3", "n3"]);
    assert_eq!(idx.driver_of("n3").unwrap().as_str(), "_1_");
    assert_eq!(idx.driver_of("alias_n3").unwrap().as_str(), "_1_");
    assert_eq!(idx.driver_of("y").unwrap().as_str(), "_2_");
}

#[test]
fn wide_net_names_are_split_per_bit() {
    let g = ConnectivityGraph::from_yosys(&design(standard_cells()), &cfg()).unwrap();
    let idx = OutputNetIndex::resolve(&g).unwrap();
    assert_eq!(idx.driver_of("bus[1]").unwrap().as_str(), "_3_");
    assert!(!idx.is_output_net("bus[0]"));
}

#[test]
fn physical_cell_outputs_are_not_output_nets() {
    let g = ConnectivityGraph::from_yosys(&design(standard_cells()), &cfg()).unwrap();
    let idx = OutputNetIndex::resolve(&g).unwrap();
    assert!(!idx.is_output_net("clk_buf"));
    assert!(idx.outputs_of("clkbuf_0_clk").is_none());
}

#[test]
fn every_output_net_has_exactly_one_driver() {
    let g = ConnectivityGraph::from_yosys(&design(standard_cells()), &cfg()).unwrap();
    let idx = OutputNetIndex::resolve(&g).unwrap();
    for net in idx.output_nets() {
        let drivers: Vec<_> = g
            .real_cells()
            .filter(|(name, _)| {
                idx.outputs_of(name.as_str())
                    .is_some_and(|outs| outs.contains(net))
            })
            .collect();
        assert_eq!(drivers.len(), 1, "net {net}");
    }
    assert_eq!(idx.output_net_count(), 4);
}

#[test]
fn shared_output_net_is_an_ambiguous_driver() {
    let cells = serde_json::json!({
        "_1_": {
            "type": "inv",
            "port_directions": { "A": "input", "Y": "output" },
            "connections": { "A": [2], "Y": [3] }
        },
        "_2_": {
            "type": "inv",
            "port_directions": { "A": "input", "Y": "output" },
            "connections": { "A": [4], "Y": [3] }
        }
    });
    let g = ConnectivityGraph::from_yosys(&design(cells), &cfg()).unwrap();
    let err = OutputNetIndex::resolve(&g).unwrap_err();
    match err {
        ChipVisError::AmbiguousDriver { net, drivers } => {
            assert!(net == "alias_n3" || net == "n3");
            assert_eq!(drivers, vec!["_1_".to_string(), "_2_".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}
