//! Painting primitives on the `tiny_skia` canvas.

use crate::surface::{LinkCode, Rect};
use image::imageops::FilterType;
use image::DynamicImage;
use tiny_skia::{FillRule, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, Transform};

const BADGE_BACKGROUND: [u8; 3] = [28, 28, 30];
const BADGE_FOREGROUND: [u8; 3] = [255, 255, 255];

/// A surface rectangle snapped to canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Scale `rect` into canvas pixels and clip it. `None` when nothing remains.
    pub fn from_surface(
        rect: &Rect,
        scale: f32,
        canvas_width: u32,
        canvas_height: u32,
    ) -> Option<Self> {
        let x0 = ((rect.x * scale).round().max(0.0) as u32).min(canvas_width);
        let y0 = ((rect.y * scale).round().max(0.0) as u32).min(canvas_height);
        let x1 = ((rect.right() * scale).round().max(0.0) as u32).min(canvas_width);
        let y1 = ((rect.bottom() * scale).round().max(0.0) as u32).min(canvas_height);
        (x1 > x0 && y1 > y0).then_some(Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    fn to_skia(self) -> Option<tiny_skia::Rect> {
        tiny_skia::Rect::from_xywh(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        )
    }
}

/// An opaque solid paint.
pub(crate) fn solid(color: [u8; 3], anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], 255);
    paint.anti_alias = anti_alias;
    paint
}

pub(super) fn fill_rect(canvas: &mut Pixmap, rect: PixelRect, color: [u8; 3]) {
    if let Some(rect) = rect.to_skia() {
        canvas.fill_rect(rect, &solid(color, false), Transform::identity(), None);
    }
}

/// Cover-fit `image` into exactly `width` by `height` pixels (center crop).
///
/// Transparency is dropped, so the result is opaque.
pub(super) fn fit_image(image: &DynamicImage, width: u32, height: u32) -> Option<Pixmap> {
    let fitted = image
        .resize_to_fill(width, height, FilterType::Lanczos3)
        .to_rgb8();
    let size = IntSize::from_wh(fitted.width(), fitted.height())?;
    let rgba = DynamicImage::ImageRgb8(fitted).into_rgba8().into_raw();
    Pixmap::from_vec(rgba, size)
}

pub(super) fn blit(canvas: &mut Pixmap, image: &Pixmap, rect: PixelRect) {
    canvas.draw_pixmap(
        rect.x as i32,
        rect.y as i32,
        image.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
}

/// Paint a round play badge centered in `rect`.
pub(super) fn play_badge(canvas: &mut Pixmap, rect: PixelRect) {
    let cx = rect.x as f32 + rect.width as f32 / 2.0;
    let cy = rect.y as f32 + rect.height as f32 / 2.0;
    let radius = (rect.width.min(rect.height) as f32 * 0.14).max(8.0);

    if let Some(circle) = PathBuilder::from_circle(cx, cy, radius) {
        canvas.fill_path(
            &circle,
            &solid(BADGE_BACKGROUND, true),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    // Triangle pointing right, optically centered.
    let size = radius * 0.9;
    let mut triangle = PathBuilder::new();
    triangle.move_to(cx - size * 0.4, cy - size * 0.55);
    triangle.line_to(cx + size * 0.6, cy);
    triangle.line_to(cx - size * 0.4, cy + size * 0.55);
    triangle.close();
    if let Some(triangle) = triangle.finish() {
        canvas.fill_path(
            &triangle,
            &solid(BADGE_FOREGROUND, true),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

/// Paint the dark modules of `code`; the light background is a separate fill.
pub(super) fn link_code(canvas: &mut Pixmap, code: &LinkCode, scale: f32) {
    let module = code.module_size() * scale;
    let (left, top) = (code.rect.x * scale, code.rect.y * scale);
    let mut path = PathBuilder::new();
    for y in 0..code.modules {
        for x in 0..code.modules {
            if !code.is_dark(x, y) {
                continue;
            }
            let cell = tiny_skia::Rect::from_xywh(
                left + x as f32 * module,
                top + y as f32 * module,
                module,
                module,
            );
            if let Some(cell) = cell {
                path.push_rect(cell);
            }
        }
    }
    if let Some(path) = path.finish() {
        canvas.fill_path(
            &path,
            &solid(code.color, false),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}
