use std::sync::Arc;

use super::{
    encode::{
        EdgeDetect, EncodedSequence, Encoder, ExpDecay, ExpHeatmap, LinHeatmap, encode_direct,
        encode_direct_filtered, encode_with,
    },
    fold::NetTransition,
    mode::EncodingMode,
    sample::{Sample, SampleSequence},
};
use crate::{config::VisConfig, foundation::ids::NetName};

fn seq(nets: &[&str], rows: &[&[u8]]) -> SampleSequence {
    let nets: Arc<[NetName]> = nets.iter().map(|n| NetName::new(*n)).collect();
    SampleSequence {
        nets,
        cycles: rows
            .iter()
            .enumerate()
            .map(|(i, r)| Sample {
                label: format!("step {i}"),
                values: r.iter().map(|v| *v != 0).collect(),
            })
            .collect(),
    }
}

fn column(e: &EncodedSequence, net: &str) -> Vec<f32> {
    (0..e.len()).map(|i| e.value_of(i, net).unwrap()).collect()
}

fn assert_close(got: &[f32], want: &[f32]) {
    assert_eq!(got.len(), want.len());
    for (g, w) in got.iter().zip(want) {
        assert!((g - w).abs() < 1e-5, "got {got:?}, want {want:?}");
    }
}

#[test]
fn mode_indices_round_trip_and_parse() {
    for m in EncodingMode::ALL {
        assert_eq!(EncodingMode::from_index(m.index()).unwrap(), m);
    }
    assert!(EncodingMode::from_index(6).is_err());
    assert_eq!(
        EncodingMode::parse_list(" 5,0 ,2").unwrap(),
        vec![
            EncodingMode::LinHeatmap,
            EncodingMode::Direct,
            EncodingMode::Edge
        ]
    );
    assert!(EncodingMode::parse_list("1,a").is_err());
    assert!(EncodingMode::ExpDecay.is_brightness());
    assert!(!EncodingMode::Edge.is_brightness());
}

#[test]
fn edge_detection_shows_raw_values_at_cycle_zero() {
    // X = [0,0,1,1], Y = [1,0,0,0]
    let s = seq(&["X", "Y"], &[&[0, 1], &[0, 0], &[1, 0], &[1, 0]]);
    let e = encode_with(EncodingMode::Edge, &EdgeDetect, &s);
    assert_eq!(column(&e, "X"), vec![0.0, 0.0, 1.0, 0.0]);
    assert_eq!(column(&e, "Y"), vec![1.0, 1.0, 0.0, 0.0]);
}

#[test]
fn constant_high_net_is_filtered_to_zero() {
    let s = seq(&["C", "T"], &[&[1, 0], &[1, 1], &[1, 0], &[1, 1], &[1, 1]]);
    let e = encode_direct_filtered(&s);
    assert_eq!(column(&e, "C"), vec![0.0; 5]);
    assert_eq!(column(&e, "T"), vec![0.0, 1.0, 0.0, 1.0, 1.0]);
}

#[test]
fn filtering_is_idempotent() {
    let s = seq(&["A", "B", "C"], &[&[1, 0, 1], &[1, 1, 0], &[1, 0, 0]]);
    let once = encode_direct_filtered(&s);

    let as_samples = SampleSequence {
        nets: Arc::clone(&once.nets),
        cycles: once
            .cycles
            .iter()
            .map(|c| Sample {
                label: c.label.clone(),
                values: c.values.iter().map(|v| *v > 0.5).collect(),
            })
            .collect(),
    };
    let twice = encode_direct_filtered(&as_samples);
    assert_eq!(once, twice);
}

#[test]
fn exp_decay_sequence() {
    let s = seq(&["N"], &[&[1], &[1], &[1], &[1]]);
    let e = encode_with(EncodingMode::ExpDecay, &ExpDecay { decay: 0.8 }, &s);
    assert_close(&column(&e, "N"), &[1.0, 0.8, 0.64, 0.512]);
}

#[test]
fn exp_decay_restarts_on_change() {
    let t = ExpDecay { decay: 0.5 };
    let b = t.step(t.initial(), true);
    let b = t.step(b, false);
    assert!((t.render(b) - 0.5).abs() < 1e-6);
    assert_eq!(t.render(t.step(b, true)), 1.0);
}

#[test]
fn heatmap_state_stays_within_bounds() {
    let exp = ExpHeatmap {
        grow: 1.2,
        decay: 0.8,
    };
    let lin = LinHeatmap {
        grow: 0.15,
        decay: 0.15,
    };
    let pattern = [
        true, true, true, true, true, true, true, false, false, true, false, false,
    ];

    let (mut te, mut tl) = (exp.initial(), lin.initial());
    for &changed in pattern.iter().cycle().take(200) {
        te = exp.step(te, changed);
        tl = lin.step(tl, changed);
        assert!((0.5..=1.5).contains(&te), "exp heat {te}");
        assert!((0.5..=1.5).contains(&tl), "lin heat {tl}");
        assert!((0.0..=1.0).contains(&exp.render(te)));
        assert!((0.0..=1.0).contains(&lin.render(tl)));
    }
}

#[test]
fn exp_heatmap_clamps_unusual_factors() {
    let t = ExpHeatmap {
        grow: 0.5,
        decay: 2.0,
    };
    let mut heat = t.initial();
    for changed in [true, true, false, false, false, true] {
        heat = t.step(heat, changed);
        assert!((0.5..=1.5).contains(&heat), "heat {heat}");
    }
}

#[test]
fn heatmaps_saturate_and_cool() {
    let lin = LinHeatmap {
        grow: 0.15,
        decay: 0.15,
    };
    let mut t = lin.initial();
    for _ in 0..10 {
        t = lin.step(t, true);
    }
    assert_eq!(lin.render(t), 1.0);
    for _ in 0..10 {
        t = lin.step(t, false);
    }
    assert_eq!(lin.render(t), 0.0);

    let exp = ExpHeatmap {
        grow: 1.2,
        decay: 0.8,
    };
    let t = exp.step(exp.initial(), true);
    assert!((exp.render(t) - 0.1).abs() < 1e-6);
}

#[test]
fn all_encodings_are_aligned_with_labels() {
    let s = seq(&["A", "B"], &[&[0, 1], &[1, 1], &[0, 0]]);
    let cfg = VisConfig {
        status_signal: "tb.status".to_string(),
        clock_signal: "clk".to_string(),
        ..VisConfig::default()
    }
    .validated()
    .unwrap();
    let all = Encoder::new(&cfg).encode_all(&EncodingMode::ALL, &s);
    assert_eq!(all.len(), 6);
    for (e, m) in all.iter().zip(EncodingMode::ALL) {
        assert_eq!(e.mode, m);
        assert_eq!(e.len(), s.len());
        for (enc, raw) in e.cycles.iter().zip(&s.cycles) {
            assert_eq!(enc.label, raw.label);
            assert_eq!(enc.values.len(), s.nets.len());
            assert!(enc.values.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }
    assert_eq!(all[0], encode_direct(&s));
}

#[test]
fn empty_sequence_encodes_to_empty() {
    let s = seq(&["A"], &[]);
    assert!(encode_direct_filtered(&s).is_empty());
    assert!(encode_with(EncodingMode::Edge, &EdgeDetect, &s).is_empty());
}
