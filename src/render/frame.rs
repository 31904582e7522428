use crate::foundation::{
    core::Rgb8,
    error::{ChipVisError, ChipVisResult},
};

/// A rendered frame as opaque RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// A `width` x `height` frame filled with `color`.
    pub fn filled(width: u32, height: u32, color: Rgb8) -> ChipVisResult<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| ChipVisError::render("frame buffer size overflow"))?;
        if width == 0 || height == 0 {
            return Err(ChipVisError::render(format!(
                "frame must be non-empty, got {width}x{height}"
            )));
        }
        let px = color.to_rgba();
        let mut data = Vec::with_capacity(len);
        for _ in 0..(len / 4) {
            data.extend_from_slice(&px);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    /// Color at (`x`, `y`). Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb8 {
        let i = self.offset(x, y);
        Rgb8::new(self.data[i], self.data[i + 1], self.data[i + 2])
    }

    /// Fill columns `x0..x1` of rows `y0..y1`, clipped to the frame.
    pub fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb8) {
        let (x1, y1) = (x1.min(self.width), y1.min(self.height));
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let px = color.to_rgba();
        for y in y0..y1 {
            let start = self.offset(x0, y);
            let end = self.offset(x1, y);
            for chunk in self.data[start..end].chunks_exact_mut(4) {
                chunk.copy_from_slice(&px);
            }
        }
    }

    /// Whether any pixel of row `y` differs from pure black.
    pub fn row_has_content(&self, y: u32) -> bool {
        let start = self.offset(0, y);
        let end = self.offset(0, y + 1);
        self.data[start..end]
            .chunks_exact(4)
            .any(|px| px[0] != 0 || px[1] != 0 || px[2] != 0)
    }

    /// Append `rows` rows filled with `color` below the frame.
    pub fn extend_rows(&mut self, rows: u32, color: Rgb8) {
        let px = color.to_rgba();
        let extra = (rows as usize) * (self.width as usize);
        self.data.reserve(extra * 4);
        for _ in 0..extra {
            self.data.extend_from_slice(&px);
        }
        self.height += rows;
    }

    /// Convert into an `image` buffer.
    pub fn into_image(self) -> ChipVisResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data)
            .ok_or_else(|| ChipVisError::render("frame buffer does not match its dimensions"))
    }

    /// Wrap an `image` buffer.
    pub fn from_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}
