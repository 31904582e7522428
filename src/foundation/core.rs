pub use kurbo::Rect;

/// Opaque RGB color, 8 bits per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Build a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pure black; the true background outside the placed silicon.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Linear interpolation towards `to` by `t` in `[0, 1]` (clamped).
    pub fn lerp(self, to: Self, t: f32) -> Self {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        fn ch(a: u8, b: u8, t: f32) -> u8 {
            let a = f32::from(a);
            let b = f32::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        }
        Self {
            r: ch(self.r, to.r, t),
            g: ch(self.g, to.g, t),
            b: ch(self.b, to.b, t),
        }
    }

    /// RGBA8 bytes with opaque alpha.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

/// Fixed color table used by the frame renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Real cell whose net is high / recently active.
    pub on: Rgb8,
    /// Real cell whose net is low / idle.
    pub off: Rgb8,
    /// Union of all placed instances, painted beneath the real cells.
    pub active_region: Rgb8,
    /// Status label text.
    pub text: Rgb8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            on: Rgb8::new(0xed, 0x55, 0x3b),
            off: Rgb8::new(0x40, 0x40, 0x40),
            active_region: Rgb8::new(0x0d, 0x14, 0x18),
            text: Rgb8::new(0xff, 0xff, 0xff),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
