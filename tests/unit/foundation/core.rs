use super::*;

#[test]
fn lerp_endpoints_match_inputs() {
    let a = Rgb8::new(0x40, 0x40, 0x40);
    let b = Rgb8::new(0xed, 0x55, 0x3b);
    assert_eq!(a.lerp(b, 0.0), a);
    assert_eq!(a.lerp(b, 1.0), b);
}

#[test]
fn lerp_clamps_out_of_range_weights() {
    let a = Rgb8::new(0, 0, 0);
    let b = Rgb8::new(200, 100, 50);
    assert_eq!(a.lerp(b, 2.0), b);
    assert_eq!(a.lerp(b, -1.0), a);
    assert_eq!(a.lerp(b, f32::NAN), a);
}

#[test]
fn lerp_midpoint_rounds() {
    let a = Rgb8::new(0, 0, 0);
    let b = Rgb8::new(255, 101, 1);
    assert_eq!(a.lerp(b, 0.5), Rgb8::new(128, 51, 1));
}

#[test]
fn palette_active_region_is_not_black() {
    let p = Palette::default();
    assert_ne!(p.active_region, Rgb8::BLACK);
    assert_ne!(p.on, p.off);
}
