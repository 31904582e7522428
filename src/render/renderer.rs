use std::{collections::BTreeSet, sync::Arc};

use crate::{
    activity::encode::EncodedSample,
    config::VisConfig,
    foundation::{
        core::{Palette, Rect, Rgb8},
        error::{ChipVisError, ChipVisResult},
    },
    layout::bind::{BoundLayout, NetSlot},
    render::{
        blur::box_blur_keep_black,
        frame::FrameRGBA,
        text::{FittedText, TextBackend, fit_text_scale},
    },
    wave::label::pad_label,
};

/// Left margin of the status label, in pixels.
pub const TEXT_MARGIN_PX: u32 = 10;
/// Labels must fit within the frame width minus this many pixels.
pub const TEXT_SLACK_PX: u32 = 2 * TEXT_MARGIN_PX;
/// Always part of the fitted vocabulary so short label sets keep a readable size.
pub const REFERENCE_LABEL: &str = "------------";
/// Text gutter height relative to the fitted text height.
pub const GUTTER_RATIO: f32 = 1.3;
/// Rows skipped past the first non-background row before looking for the end of the silicon.
pub const ANCHOR_SCAN_OFFSET: u32 = 4;
/// Absolute tolerance of the text scale search.
pub const TEXT_FIT_TOLERANCE: f32 = 1e-3;

/// Pixel-space box: columns `x0..x1`, rows `y0..y1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    /// First column.
    pub x0: u32,
    /// First row.
    pub y0: u32,
    /// End column (exclusive).
    pub x1: u32,
    /// End row (exclusive).
    pub y1: u32,
}

/// Map a layout box to signed pixel bounds.
///
/// Layout x maps to columns. Layout y grows upward while rows grow downward, so frames show the
/// die in plan view with its top edge first rather than transposed.
fn project(r: Rect, scale: f64, layout_height: f64) -> [i64; 4] {
    [
        (scale * r.x0).floor() as i64,
        (scale * (layout_height - r.y1)).floor() as i64,
        (scale * r.x1).floor() as i64,
        (scale * (layout_height - r.y0)).floor() as i64,
    ]
}

#[derive(Clone, Copy, Debug)]
struct PaintCell {
    rect: PixelRect,
    column: Option<usize>,
}

/// Renders encoded samples into frames.
///
/// Geometry, colors and the fitted text size are fixed at construction; [`FrameRenderer::render`]
/// only reads them, so one renderer can be shared across threads.
pub struct FrameRenderer {
    width: u32,
    height: u32,
    active: Option<PixelRect>,
    cells: Vec<PaintCell>,
    net_count: usize,
    palette: Palette,
    blur: u32,
    downscale: f64,
    text: Arc<dyn TextBackend>,
    fitted: FittedText,
}

impl FrameRenderer {
    /// Precompute pixel geometry and fit the status text to the frame width.
    ///
    /// `labels` is the label vocabulary of the run. Fails when a real cell lands outside the
    /// canvas or when no text size fits.
    #[tracing::instrument(skip_all)]
    pub fn new<'a>(
        layout: &BoundLayout,
        cfg: &VisConfig,
        text: Arc<dyn TextBackend>,
        labels: impl IntoIterator<Item = &'a str>,
    ) -> ChipVisResult<Self> {
        let scale = f64::from(cfg.scale);
        let width = (scale * layout.width).floor() as u32 + 1;
        let height = (scale * layout.height).floor() as u32 + 1;

        let active = layout.active_region.map(|r| {
            let [x0, y0, x1, y1] = project(r, scale, layout.height);
            let clamp = |v: i64, max: u32| v.clamp(0, i64::from(max)) as u32;
            PixelRect {
                x0: clamp(x0, width),
                y0: clamp(y0, height),
                x1: clamp(x1, width),
                y1: clamp(y1, height),
            }
        });

        let mut cells = Vec::with_capacity(layout.cells.len());
        for cell in &layout.cells {
            let [x0, y0, x1, y1] = project(cell.bbox, scale, layout.height);
            if x0 < 0 || y0 < 0 || x1 >= i64::from(width) || y1 >= i64::from(height) {
                return Err(ChipVisError::render(format!(
                    "cell '{}' at ({x0}, {y0})-({x1}, {y1}) px lies outside the {width}x{height} canvas",
                    cell.name
                )));
            }
            let column = match cell.slot {
                NetSlot::Sampled(i) => Some(i),
                NetSlot::Unsampled(_) | NetSlot::NoOutput => None,
            };
            cells.push(PaintCell {
                rect: PixelRect {
                    x0: x0 as u32,
                    y0: y0 as u32,
                    x1: x1 as u32,
                    y1: y1 as u32,
                },
                column,
            });
        }

        let (out_w, _) = scaled_size(width, height, cfg.downscale);
        tracing::info!(width = out_w, "frame width");

        let vocabulary: BTreeSet<&str> = labels
            .into_iter()
            .chain(std::iter::once(REFERENCE_LABEL))
            .collect();
        let max_width = out_w.saturating_sub(TEXT_SLACK_PX) as f32;
        let fitted = fit_text_scale(
            text.as_ref(),
            vocabulary,
            max_width,
            cfg.font_thickness,
            TEXT_FIT_TOLERANCE,
        )?;
        tracing::info!(
            scale = fitted.scale,
            height = fitted.height,
            thickness = fitted.thickness,
            "status text fitted"
        );

        Ok(Self {
            width,
            height,
            active,
            cells,
            net_count: layout.nets.len(),
            palette: layout.palette,
            blur: cfg.blur,
            downscale: cfg.downscale,
            text,
            fitted,
        })
    }

    /// Canvas size before downscaling and the text gutter.
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Fitted text parameters.
    pub fn fitted_text(&self) -> FittedText {
        self.fitted
    }

    /// Rows of the text gutter.
    pub fn gutter_rows(&self) -> u32 {
        (GUTTER_RATIO * self.fitted.height).floor().max(0.0) as u32
    }

    /// Size of every emitted frame.
    pub fn frame_size(&self) -> (u32, u32) {
        let (w, h) = scaled_size(self.width, self.height, self.downscale);
        (w, h + self.gutter_rows())
    }

    /// Render one encoded sample.
    ///
    /// `brightness` selects interpolated colors instead of on/off.
    pub fn render(&self, sample: &EncodedSample, brightness: bool) -> ChipVisResult<FrameRGBA> {
        if sample.values.len() != self.net_count {
            return Err(ChipVisError::render(format!(
                "encoded sample carries {} nets, layout is bound to {}",
                sample.values.len(),
                self.net_count
            )));
        }

        let mut frame = self.paint(sample, brightness)?;
        box_blur_keep_black(&mut frame, self.blur)?;
        let mut frame = self.downscaled(frame)?;

        let content_rows = frame.height;
        let fill = frame.pixel(frame.width - 1, frame.height - 1);
        frame.extend_rows(self.gutter_rows(), fill);

        let anchor = label_anchor(&frame, content_rows);
        self.text.draw(
            &mut frame,
            &pad_label(&sample.label),
            TEXT_MARGIN_PX as f32,
            anchor as f32 + self.fitted.height,
            self.fitted.scale,
            self.fitted.thickness,
            self.palette.text,
        )?;
        Ok(frame)
    }

    fn paint(&self, sample: &EncodedSample, brightness: bool) -> ChipVisResult<FrameRGBA> {
        let mut frame = FrameRGBA::filled(self.width, self.height, Rgb8::BLACK)?;
        if let Some(r) = self.active {
            frame.fill_rect(r.x0, r.y0, r.x1, r.y1, self.palette.active_region);
        }
        for cell in &self.cells {
            let v = cell.column.map_or(0.0, |i| sample.values[i]);
            let color = if brightness {
                self.palette.off.lerp(self.palette.on, v)
            } else if v > 0.5 {
                self.palette.on
            } else {
                self.palette.off
            };
            let r = cell.rect;
            frame.fill_rect(r.x0, r.y0, r.x1, r.y1, color);
        }
        Ok(frame)
    }

    fn downscaled(&self, frame: FrameRGBA) -> ChipVisResult<FrameRGBA> {
        let (w, h) = scaled_size(frame.width, frame.height, self.downscale);
        if (w, h) == (frame.width, frame.height) {
            return Ok(frame);
        }
        let img = frame.into_image()?;
        let out = image::imageops::resize(&img, w, h, image::imageops::FilterType::Triangle);
        Ok(FrameRGBA::from_image(out))
    }
}

fn scaled_size(width: u32, height: u32, factor: f64) -> (u32, u32) {
    let s = |v: u32| ((f64::from(v) * factor).round() as u32).max(1);
    (s(width), s(height))
}

/// Row just below the first block of silicon rows.
///
/// Scanning starts a few rows past the first non-black row; the first black row after it is the
/// anchor. Falls back to `content_rows` when the silicon reaches the bottom.
pub fn label_anchor(frame: &FrameRGBA, content_rows: u32) -> u32 {
    let first = (0..frame.height)
        .find(|&y| frame.row_has_content(y))
        .unwrap_or(0)
        + ANCHOR_SCAN_OFFSET;
    (first..frame.height)
        .find(|&y| !frame.row_has_content(y))
        .unwrap_or(content_rows)
}
