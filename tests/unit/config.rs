use super::*;

fn base() -> VisConfig {
    VisConfig {
        prefix: "tb.uut.".to_string(),
        status_signal: "tb.status".to_string(),
        clock_signal: "clk".to_string(),
        reset_signal: Some("rst".to_string()),
        ..VisConfig::default()
    }
}

#[test]
fn defaults_validate() {
    let cfg = base().validated().unwrap();
    assert_eq!(cfg.scale, 3);
    assert_eq!(cfg.fps, 8);
    assert_eq!(cfg.blur, 7);
    assert_eq!(cfg.modes, EncodingMode::ALL.to_vec());
    assert!(cfg.is_ignored_port("VPWR"));
    assert!(!cfg.is_ignored_port("Y"));
}

#[test]
fn numeric_preconditions_are_enforced() {
    assert!(VisConfig { scale: 1, ..base() }.validated().is_err());
    assert!(VisConfig { fps: 0, ..base() }.validated().is_err());
    assert!(VisConfig { downscale: 0.0, ..base() }.validated().is_err());
    assert!(
        VisConfig {
            downscale: f64::NAN,
            ..base()
        }
        .validated()
        .is_err()
    );
    assert!(
        VisConfig {
            modes: vec![],
            ..base()
        }
        .validated()
        .is_err()
    );
}

#[test]
fn blur_is_coerced_to_odd_minimum_three() {
    assert_eq!(VisConfig { blur: 0, ..base() }.validated().unwrap().blur, 3);
    assert_eq!(VisConfig { blur: 4, ..base() }.validated().unwrap().blur, 5);
    assert_eq!(VisConfig { blur: 9, ..base() }.validated().unwrap().blur, 9);
}

#[test]
fn factor_magnitudes_are_used() {
    let cfg = VisConfig {
        exp_grow: -1.5,
        exp_decay: -0.5,
        lin_grow: -0.1,
        lin_decay: 0.2,
        ..base()
    }
    .validated()
    .unwrap();
    assert_eq!(cfg.exp_grow, 1.5);
    assert_eq!(cfg.exp_decay, 0.5);
    assert_eq!(cfg.lin_grow, 0.1);
    assert_eq!(cfg.lin_decay, 0.2);
}

#[test]
fn exp_decay_above_one_is_rejected() {
    let err = VisConfig {
        exp_decay: -1.25,
        ..base()
    }
    .validated()
    .unwrap_err();
    assert!(err.to_string().contains("exp_decay"), "{err}");
    assert!(VisConfig { exp_decay: 1.0, ..base() }.validated().is_ok());
}

#[test]
fn modes_are_sorted_and_deduplicated() {
    let cfg = VisConfig {
        modes: vec![
            EncodingMode::LinHeatmap,
            EncodingMode::Direct,
            EncodingMode::LinHeatmap,
        ],
        ..base()
    }
    .validated()
    .unwrap();
    assert_eq!(cfg.modes, vec![EncodingMode::Direct, EncodingMode::LinHeatmap]);
}

#[test]
fn empty_reset_name_means_no_reset() {
    let cfg = VisConfig {
        reset_signal: Some("  ".to_string()),
        ..base()
    }
    .validated()
    .unwrap();
    assert_eq!(cfg.reset_signal, None);
}

#[test]
fn prefix_lists_accept_comma_separated_entries() {
    let cfg = VisConfig {
        phy_prefixes: vec!["clkbuf_, PHY_".to_string(), "ANTENNA_".to_string()],
        ..base()
    }
    .validated()
    .unwrap();
    assert_eq!(cfg.phy_prefixes, vec!["clkbuf_", "PHY_", "ANTENNA_"]);
}

#[test]
fn json_document_fills_missing_fields_with_defaults() {
    let cfg: VisConfig = serde_json::from_str(
        r#"{ "prefix": "tb.uut.", "status_signal": "tb.status", "clock_signal": "clk", "modes": [3, 0] }"#,
    )
    .unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.modes, vec![EncodingMode::Direct, EncodingMode::ExpDecay]);
    assert_eq!(cfg.filler_prefixes, vec!["FILLER_"]);
}

#[test]
fn unknown_mode_index_is_rejected() {
    let res: Result<VisConfig, _> = serde_json::from_str(r#"{ "modes": [6] }"#);
    assert!(res.is_err());
    assert!(EncodingMode::parse_list("0, 2,5").is_ok());
    assert!(EncodingMode::parse_list("7").is_err());
    assert!(EncodingMode::parse_list("a").is_err());
}
