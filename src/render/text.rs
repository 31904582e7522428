use std::{path::Path, sync::Arc};

use anyhow::Context as _;

use crate::{
    foundation::{
        core::Rgb8,
        error::{ChipVisError, ChipVisResult},
        math::mul_div255_u16,
    },
    render::frame::FrameRGBA,
};

/// Width and height of rendered text in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextMetrics {
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent, ascent plus descent.
    pub height: f32,
}

/// Text measurement and drawing capability.
///
/// `scale` is a unitless size factor; `thickness` is the stroke width in pixels.
pub trait TextBackend: Send + Sync {
    /// Measure `text` at `scale` and `thickness`.
    fn measure(&self, text: &str, scale: f32, thickness: u32) -> ChipVisResult<TextMetrics>;

    /// Draw `text` left-aligned at `x` with its baseline on row `baseline`.
    #[allow(clippy::too_many_arguments)]
    fn draw(
        &self,
        frame: &mut FrameRGBA,
        text: &str,
        x: f32,
        baseline: f32,
        scale: f32,
        thickness: u32,
        color: Rgb8,
    ) -> ChipVisResult<()>;
}

/// Result of the run-wide text fit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FittedText {
    /// Size factor.
    pub scale: f32,
    /// Stroke width in pixels.
    pub thickness: u32,
    /// Tallest label at this size, in pixels.
    pub height: f32,
}

/// Stroke thickness for `scale`: `factor * scale`, floored, at least 1.
pub fn thickness_for(scale: f32, factor: f32) -> u32 {
    ((factor * scale).floor() as u32).max(1)
}

/// Find the largest scale at which every label in `labels` is at most `max_width` wide.
///
/// The search doubles an upper bound until it no longer fits, then bisects down to `tolerance`
/// or to the f32 resolution at that scale, whichever is coarser.
/// Returns the largest scale known to fit.
pub fn fit_text_scale<'a>(
    backend: &dyn TextBackend,
    labels: impl IntoIterator<Item = &'a str>,
    max_width: f32,
    thickness_factor: f32,
    tolerance: f32,
) -> ChipVisResult<FittedText> {
    let labels: Vec<&str> = labels.into_iter().collect();
    if labels.is_empty() {
        return Err(ChipVisError::render("no labels to fit"));
    }
    if !(max_width.is_finite() && max_width > 0.0) {
        return Err(ChipVisError::render(format!(
            "text area must be wider than 0 px, got {max_width}"
        )));
    }

    let widest = |scale: f32| -> ChipVisResult<TextMetrics> {
        let thickness = thickness_for(scale, thickness_factor);
        let mut out = TextMetrics::default();
        for l in &labels {
            let m = backend.measure(l, scale, thickness)?;
            out.width = out.width.max(m.width);
            out.height = out.height.max(m.height);
        }
        Ok(out)
    };

    const MAX_DOUBLINGS: u32 = 32;
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut grown = 0;
    while widest(hi)?.width <= max_width {
        lo = hi;
        hi *= 2.0;
        grown += 1;
        if grown > MAX_DOUBLINGS {
            return Err(ChipVisError::render("text never exceeds the frame width"));
        }
    }
    // Bounded: past f32 resolution `mid` collapses onto `lo` or `hi`.
    const MAX_BISECTIONS: u32 = 64;
    for _ in 0..MAX_BISECTIONS {
        if hi - lo <= tolerance {
            break;
        }
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        if widest(mid)?.width <= max_width {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    if lo <= 0.0 {
        return Err(ChipVisError::render(format!(
            "status text does not fit in {max_width} px at any size"
        )));
    }

    let height = widest(lo)?.height;
    Ok(FittedText {
        scale: lo,
        thickness: thickness_for(lo, thickness_factor),
        height,
    })
}

/// Font size in pixels at scale 1.
const BASE_FONT_PX: f32 = 30.0;

/// Text rendered through `usvg`/`resvg` with system fonts plus fonts from extra directories.
pub struct SvgTextBackend {
    options: usvg::Options<'static>,
    family: String,
}

impl SvgTextBackend {
    /// Load system fonts and every `.ttf`/`.otf`/`.ttc` file under `font_dirs`.
    #[tracing::instrument(skip(font_dirs))]
    pub fn new(family: &str, font_dirs: &[impl AsRef<Path>]) -> ChipVisResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        for dir in font_dirs {
            load_fonts_from_dir(&mut db, dir.as_ref());
        }
        let faces = db.faces().count();
        tracing::debug!(faces, "font database ready");
        if faces == 0 {
            return Err(ChipVisError::render(
                "no fonts available; pass a font directory",
            ));
        }
        let options = usvg::Options {
            fontdb: Arc::new(db),
            font_resolver: make_font_resolver(),
            ..Default::default()
        };
        Ok(Self {
            options,
            family: family.to_string(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn tree(
        &self,
        text: &str,
        canvas: (u32, u32),
        x: f32,
        baseline: f32,
        scale: f32,
        thickness: u32,
        color: Rgb8,
    ) -> ChipVisResult<usvg::Tree> {
        let fill = format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b);
        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}"><text x="{x}" y="{baseline}" font-family="{family}" font-size="{size}" fill="{fill}" stroke="{fill}" stroke-width="{thickness}" stroke-linejoin="round" xml:space="preserve">{text}</text></svg>"#,
            w = canvas.0,
            h = canvas.1,
            family = escape_xml(&self.family),
            size = BASE_FONT_PX * scale,
            text = escape_xml(text),
        );
        usvg::Tree::from_str(&svg, &self.options)
            .map_err(|e| ChipVisError::render(format!("status text svg: {e}")))
    }
}

impl TextBackend for SvgTextBackend {
    fn measure(&self, text: &str, scale: f32, thickness: u32) -> ChipVisResult<TextMetrics> {
        let size = BASE_FONT_PX * scale;
        let extent = (size * (text.chars().count() as f32 + 2.0) + 4.0 * size).ceil();
        let canvas = (extent.max(1.0) as u32, (4.0 * size).ceil().max(1.0) as u32);
        let tree = self.tree(text, canvas, 0.0, 2.0 * size, scale, thickness, Rgb8::BLACK)?;
        if !tree.root().has_children() {
            return Ok(TextMetrics::default());
        }
        let bbox = tree.root().abs_stroke_bounding_box();
        Ok(TextMetrics {
            width: bbox.right().max(0.0),
            height: bbox.height(),
        })
    }

    fn draw(
        &self,
        frame: &mut FrameRGBA,
        text: &str,
        x: f32,
        baseline: f32,
        scale: f32,
        thickness: u32,
        color: Rgb8,
    ) -> ChipVisResult<()> {
        let tree = self.tree(
            text,
            (frame.width, frame.height),
            x,
            baseline,
            scale,
            thickness,
            color,
        )?;
        let mut pixmap = resvg::tiny_skia::Pixmap::new(frame.width, frame.height)
            .ok_or_else(|| ChipVisError::render("failed to allocate text pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );
        composite_over(&mut frame.data, pixmap.data());
        Ok(())
    }
}

/// Source-over of premultiplied `src` onto opaque `dst`.
fn composite_over(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let inv = 255 - u16::from(s[3]);
        for c in 0..3 {
            let v = u16::from(s[c]) + mul_div255_u16(u16::from(d[c]), inv);
            d[c] = v.min(255) as u8;
        }
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' | '\x0b' | '\x0c' => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db
            .load_font_file(&path)
            .with_context(|| format!("load font '{}'", path.display()))
        {
            tracing::warn!("{e:#}");
        }
    }
}

fn make_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }
            families.push(usvg::fontdb::Family::SansSerif);
            families.push(usvg::fontdb::Family::Monospace);

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style: usvg::fontdb::Style::Normal,
            };

            fontdb
                .query(&query)
                .or_else(|| fontdb.faces().next().map(|f| f.id))
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}
