use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ChipVisError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ChipVisError::netlist("x").to_string().contains("netlist error:"));
    assert!(
        ChipVisError::waveform("x")
            .to_string()
            .contains("waveform error:")
    );
    assert!(ChipVisError::layout("x").to_string().contains("layout error:"));
    assert!(ChipVisError::render("x").to_string().contains("render error:"));
    assert!(ChipVisError::encode("x").to_string().contains("encode error:"));
    assert!(
        ChipVisError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn structured_variants_name_their_subject() {
    let err = ChipVisError::AmbiguousDriver {
        net: "n1".to_string(),
        drivers: vec!["a".to_string(), "b".to_string()],
    };
    let msg = err.to_string();
    assert!(msg.starts_with("netlist error:"));
    assert!(msg.contains("'n1'"));
    assert!(msg.contains("2 cells"));
    assert!(msg.contains("a, b"));

    let err = ChipVisError::ResetNotReleased {
        signal: "rst".to_string(),
        last: "1".to_string(),
    };
    assert!(err.to_string().contains("'rst'"));

    let err = ChipVisError::StartStatusNotFound {
        marker: "BOOT".to_string(),
    };
    assert!(err.to_string().contains("BOOT"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ChipVisError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
