//! Text metrics and painting shared by the surface builder and the rasterizer.
//!
//! The builder only *measures* text (to wrap lines and compute the surface
//! height); the rasterizer later *paints* the same runs. Both must use the
//! same [`Typeface`], otherwise wrapped lines would not fit their boxes.
//!
//! - [`SystemTypeface`]: a sans-serif face discovered with `fontdb`, glyph
//!   outlines read with `ttf-parser` into a `tiny_skia` path and filled
//!   with anti-aliasing.
//! - [`BlockTypeface`]: fixed-advance fallback that paints each glyph as a
//!   solid block. Used when the host has no fonts installed, and in tests
//!   because its metrics are exact and platform-independent.

use super::paint::solid;
use std::sync::Arc;
use tiny_skia::{FillRule, PathBuilder, Pixmap, Transform};

/// Text measurement and painting at a pixel size.
pub trait Typeface: Send + Sync {
    /// Human-readable face name, for logs.
    fn name(&self) -> &str;

    /// Advance width of `text` at `size` pixels.
    fn measure(&self, text: &str, size: f32) -> f32;

    /// Distance from the top of a line box to the baseline.
    fn ascent(&self, size: f32) -> f32;

    /// Height of one line box.
    fn line_height(&self, size: f32) -> f32 {
        (size * 1.4).ceil()
    }

    /// Paint `text` with its baseline starting at `(x, baseline)`.
    fn draw(
        &self,
        canvas: &mut Pixmap,
        text: &str,
        x: f32,
        baseline: f32,
        size: f32,
        color: [u8; 3],
    );
}

/// Fill a finished glyph path, if any glyph produced an outline.
fn fill_glyphs(canvas: &mut Pixmap, path: PathBuilder, color: [u8; 3]) {
    if let Some(path) = path.finish() {
        canvas.fill_path(
            &path,
            &solid(color, true),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

// ============================================================================
// Fallback: block glyphs
// ============================================================================

/// Fixed-advance typeface painting every visible character as a block.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockTypeface;

impl BlockTypeface {
    /// Advance per character, as a fraction of the size.
    const ADVANCE: f32 = 0.55;
}

impl Typeface for BlockTypeface {
    fn name(&self) -> &str {
        "block"
    }

    fn measure(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * Self::ADVANCE
    }

    fn ascent(&self, size: f32) -> f32 {
        (size * 1.05).round()
    }

    fn draw(
        &self,
        canvas: &mut Pixmap,
        text: &str,
        x: f32,
        baseline: f32,
        size: f32,
        color: [u8; 3],
    ) {
        let advance = size * Self::ADVANCE;
        let glyph_w = advance * 0.8;
        let glyph_h = size * 0.7;
        let mut path = PathBuilder::new();
        for (i, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            let left = x + i as f32 * advance;
            let block = tiny_skia::Rect::from_xywh(left, baseline - glyph_h, glyph_w, glyph_h);
            if let Some(block) = block {
                path.push_rect(block);
            }
        }
        fill_glyphs(canvas, path, color);
    }
}

// ============================================================================
// System font
// ============================================================================

/// A TrueType/OpenType face loaded from the system font database.
pub struct SystemTypeface {
    name: String,
    data: Arc<Vec<u8>>,
    index: u32,
    units_per_em: f32,
    ascender: f32,
}

impl SystemTypeface {
    /// Parse a face from raw font bytes. Returns `None` for unparseable data.
    pub fn from_data(name: String, data: Vec<u8>, index: u32) -> Option<Self> {
        let face = ttf_parser::Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em() as f32;
        let ascender = face.ascender() as f32;
        Some(Self {
            name,
            data: Arc::new(data),
            index,
            units_per_em,
            ascender,
        })
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, self.index).ok()
    }

    fn scale(&self, size: f32) -> f32 {
        size / self.units_per_em
    }
}

impl Typeface for SystemTypeface {
    fn name(&self) -> &str {
        &self.name
    }

    fn measure(&self, text: &str, size: f32) -> f32 {
        let Some(face) = self.face() else {
            return BlockTypeface.measure(text, size);
        };
        let scale = self.scale(size);
        text.chars()
            .map(|c| {
                face.glyph_index(c)
                    .and_then(|id| face.glyph_hor_advance(id))
                    .map(|adv| adv as f32 * scale)
                    .unwrap_or(size * BlockTypeface::ADVANCE)
            })
            .sum()
    }

    fn ascent(&self, size: f32) -> f32 {
        // Center the em box in the 1.4 line box, then drop to the baseline.
        let half_leading = (self.line_height(size) - size) / 2.0;
        (half_leading + self.ascender * self.scale(size)).round()
    }

    fn draw(
        &self,
        canvas: &mut Pixmap,
        text: &str,
        x: f32,
        baseline: f32,
        size: f32,
        color: [u8; 3],
    ) {
        let Some(face) = self.face() else {
            return BlockTypeface.draw(canvas, text, x, baseline, size, color);
        };
        let scale = self.scale(size);
        let mut path = PathBuilder::new();
        let mut pen_x = x;
        for c in text.chars() {
            let Some(id) = face.glyph_index(c) else {
                pen_x += size * BlockTypeface::ADVANCE;
                continue;
            };
            let mut builder = GlyphBuilder {
                path: &mut path,
                origin_x: pen_x,
                baseline,
                scale,
            };
            face.outline_glyph(id, &mut builder);
            pen_x += face.glyph_hor_advance(id).unwrap_or(0) as f32 * scale;
        }
        fill_glyphs(canvas, path, color);
    }
}

/// Maps font units (y up) into canvas pixels (y down) at the pen position.
struct GlyphBuilder<'a> {
    path: &'a mut PathBuilder,
    origin_x: f32,
    baseline: f32,
    scale: f32,
}

impl GlyphBuilder<'_> {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.baseline - y * self.scale)
    }
}

impl ttf_parser::OutlineBuilder for GlyphBuilder<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (px, py) = self.map(x, y);
        self.path.move_to(px, py);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (px, py) = self.map(x, y);
        self.path.line_to(px, py);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (cx, cy) = self.map(x1, y1);
        let (px, py) = self.map(x, y);
        self.path.quad_to(cx, cy, px, py);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (c1x, c1y) = self.map(x1, y1);
        let (c2x, c2y) = self.map(x2, y2);
        let (px, py) = self.map(x, y);
        self.path.cubic_to(c1x, c1y, c2x, c2y, px, py);
    }

    fn close(&mut self) {
        self.path.close();
    }
}

/// Find a regular sans-serif face on this system.
pub fn load_system_typeface() -> Option<SystemTypeface> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    let id = db.query(&fontdb::Query {
        families: &[fontdb::Family::SansSerif],
        weight: fontdb::Weight::NORMAL,
        stretch: fontdb::Stretch::Normal,
        style: fontdb::Style::Normal,
    })?;
    let name = db
        .face(id)
        .and_then(|info| info.families.first().map(|(family, _)| family.clone()))
        .unwrap_or_else(|| "sans-serif".to_string());
    db.with_face_data(id, |data, index| {
        SystemTypeface::from_data(name, data.to_vec(), index)
    })
    .flatten()
}

/// The system sans-serif face, or the block fallback when none is installed.
pub fn default_typeface() -> Arc<dyn Typeface> {
    match load_system_typeface() {
        Some(face) => {
            log::debug!("Using system typeface '{}'", face.name());
            Arc::new(face)
        }
        None => {
            log::warn!("No system sans-serif font found; text prints as block glyphs");
            Arc::new(BlockTypeface)
        }
    }
}
