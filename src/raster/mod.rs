//! Rasterization: capturing a [`ContentSurface`] as one tall RGB image.
//!
//! The capture is `scale` times the surface in both dimensions, so text and
//! photos stay legible once the paginator shrinks the raster to page width.
//!
//! Painting happens in block order on a `tiny_skia` canvas. Image fitting
//! (cover crop with Lanczos3) is the expensive part and is fanned out with
//! `rayon` before the ordered painting pass; it only reads the resolved media
//! and produces owned pixmaps, so no state is shared between workers. The
//! finished canvas is flattened to RGB for JPEG encoding.
//!
//! ## Modules
//!
//! - [`typeface`]: text metrics and painting, shared with layout
//! - `paint`: rectangles, image fitting, play badges, link codes

mod paint;
pub mod typeface;

use crate::media::ResolvedMedia;
use crate::model::MediaKind;
use crate::surface::{Block, ContentSurface, MediaBox};
use image::{Rgb, RgbImage};
use paint::PixelRect;
use rayon::prelude::*;
use std::collections::HashMap;
use thiserror::Error;
use tiny_skia::{Color, Pixmap};
use typeface::Typeface;

/// Longest raster edge the paginator can embed (the baseline JPEG limit).
pub const MAX_EDGE: u32 = u16::MAX as u32;

#[derive(Error, Debug)]
pub enum RasterizationError {
    #[error("Surface has no area ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },
    #[error("Capture scale must be at least 1, got {0}")]
    InvalidScale(u32),
    #[error("Capture of {width}x{height} exceeds the budget of {max_pixels} pixels")]
    TooLarge {
        width: u64,
        height: u64,
        max_pixels: u64,
    },
    #[error("Capture of {width}x{height} has an edge longer than {max_edge} pixels")]
    EdgeTooLong {
        width: u64,
        height: u64,
        max_edge: u32,
    },
    #[error("Could not allocate a {width}x{height} canvas")]
    Allocation { width: u32, height: u32 },
}

/// A captured surface.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixels: RgbImage,
}

impl RasterImage {
    /// A uniformly colored raster.
    pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        Self {
            pixels: RgbImage::from_pixel(width, height, Rgb(color)),
        }
    }

    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn to_rgb(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels.get_pixel(x, y).0
    }
}

/// Paint `surface` at `scale` using the settled `media`.
///
/// The result is exactly `surface.width * scale` by `surface.height * scale`.
/// Captures over `max_pixels`, or with an edge over [`MAX_EDGE`], are refused
/// before anything is allocated.
pub fn rasterize(
    surface: &ContentSurface,
    media: &ResolvedMedia,
    typeface: &dyn Typeface,
    scale: u32,
    max_pixels: u64,
) -> Result<RasterImage, RasterizationError> {
    if surface.width == 0 || surface.height == 0 {
        return Err(RasterizationError::EmptySurface {
            width: surface.width,
            height: surface.height,
        });
    }
    if scale == 0 {
        return Err(RasterizationError::InvalidScale(scale));
    }

    let width = surface.width as u64 * scale as u64;
    let height = surface.height as u64 * scale as u64;
    if width * height > max_pixels {
        return Err(RasterizationError::TooLarge {
            width,
            height,
            max_pixels,
        });
    }
    if width > MAX_EDGE as u64 || height > MAX_EDGE as u64 {
        return Err(RasterizationError::EdgeTooLong {
            width,
            height,
            max_edge: MAX_EDGE,
        });
    }
    let (width, height) = (width as u32, height as u32);
    let mut canvas = Pixmap::new(width, height)
        .ok_or(RasterizationError::Allocation { width, height })?;
    let [r, g, b] = surface.background;
    canvas.fill(Color::from_rgba8(r, g, b, 255));
    let factor = scale as f32;

    let fitted = fit_media(surface, media, factor, width, height);
    log::debug!(
        "Rasterizing {}x{} ({} blocks, {} fitted images)",
        width,
        height,
        surface.blocks.len(),
        fitted.len()
    );

    for (index, block) in surface.blocks.iter().enumerate() {
        match block {
            Block::Fill { rect, color } => {
                if let Some(px) = PixelRect::from_surface(rect, factor, width, height) {
                    paint::fill_rect(&mut canvas, px, *color);
                }
            }
            Block::Text(run) => typeface.draw(
                &mut canvas,
                &run.text,
                run.x * factor,
                run.baseline * factor,
                run.size * factor,
                run.color,
            ),
            Block::Media(media_box) => {
                let Some(px) = PixelRect::from_surface(&media_box.rect, factor, width, height)
                else {
                    continue;
                };
                match fitted.get(&index) {
                    Some(image) => paint::blit(&mut canvas, image, px),
                    None => paint::fill_rect(&mut canvas, px, surface.placeholder),
                }
                if media_box.kind == MediaKind::Video {
                    paint::play_badge(&mut canvas, px);
                }
            }
            Block::Code(code) => paint::link_code(&mut canvas, code, factor),
        }
    }

    flatten(&canvas).map(RasterImage::from_rgb)
}

/// Fit every loaded image to its box in parallel, keyed by block index.
fn fit_media(
    surface: &ContentSurface,
    media: &ResolvedMedia,
    factor: f32,
    width: u32,
    height: u32,
) -> HashMap<usize, Pixmap> {
    let jobs: Vec<(usize, &MediaBox, PixelRect)> = surface
        .blocks
        .iter()
        .enumerate()
        .filter_map(|(index, block)| match block {
            Block::Media(media_box) => {
                PixelRect::from_surface(&media_box.rect, factor, width, height)
                    .map(|px| (index, media_box, px))
            }
            _ => None,
        })
        .collect();

    jobs.par_iter()
        .filter_map(|(index, media_box, px)| {
            let image = media.image(&media_box.url)?;
            Some((*index, paint::fit_image(image, px.width, px.height)?))
        })
        .collect()
}

/// Drop the alpha channel of an opaque canvas.
fn flatten(canvas: &Pixmap) -> Result<RgbImage, RasterizationError> {
    let (width, height) = (canvas.width(), canvas.height());
    let allocation_failed = || RasterizationError::Allocation { width, height };
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(width as usize * height as usize * 3)
        .map_err(|_| allocation_failed())?;
    for pixel in canvas.pixels() {
        let color = pixel.demultiply();
        buffer.extend([color.red(), color.green(), color.blue()]);
    }
    RgbImage::from_raw(width, height, buffer).ok_or_else(allocation_failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaAsset, MediaManifest, ResolvedAsset};
    use crate::raster::typeface::BlockTypeface;
    use crate::surface::{LinkCode, Rect, TextRun};
    use image::DynamicImage;
    use std::sync::Arc;

    const WHITE: [u8; 3] = [255, 255, 255];
    const GREY: [u8; 3] = [200, 200, 200];

    fn surface(width: u32, height: u32, blocks: Vec<Block>) -> ContentSurface {
        ContentSurface {
            width,
            height,
            background: WHITE,
            placeholder: GREY,
            blocks,
            sections: Vec::new(),
            media: MediaManifest::default(),
        }
    }

    fn media_box(url: &str, kind: MediaKind, rect: Rect) -> Block {
        Block::Media(MediaBox {
            rect,
            url: url.to_string(),
            kind,
        })
    }

    fn loaded(url: &str, color: [u8; 3]) -> ResolvedAsset {
        ResolvedAsset {
            source_url: url.to_string(),
            resolved_url: url.to_string(),
            asset: MediaAsset::Loaded(Arc::new(DynamicImage::ImageRgb8(RgbImage::from_pixel(
                40,
                30,
                Rgb(color),
            )))),
            failure: None,
        }
    }

    fn close_to(actual: [u8; 3], expected: [u8; 3]) -> bool {
        actual
            .iter()
            .zip(expected)
            .all(|(a, e)| (*a as i16 - e as i16).abs() <= 2)
    }

    // =========================================================================
    // Dimensions and limits
    // =========================================================================

    #[test]
    fn output_is_exactly_scaled_surface() {
        let s = surface(120, 75, Vec::new());
        let raster = rasterize(&s, &ResolvedMedia::default(), &BlockTypeface, 2, u64::MAX).unwrap();
        assert_eq!((raster.width(), raster.height()), (240, 150));
        assert_eq!(raster.pixel(0, 0), WHITE);
        assert_eq!(raster.pixel(239, 149), WHITE);
    }

    #[test]
    fn empty_surface_is_rejected() {
        let s = surface(100, 0, Vec::new());
        assert!(matches!(
            rasterize(&s, &ResolvedMedia::default(), &BlockTypeface, 2, u64::MAX),
            Err(RasterizationError::EmptySurface { .. })
        ));
    }

    #[test]
    fn zero_scale_is_rejected() {
        let s = surface(100, 100, Vec::new());
        assert!(matches!(
            rasterize(&s, &ResolvedMedia::default(), &BlockTypeface, 0, u64::MAX),
            Err(RasterizationError::InvalidScale(0))
        ));
    }

    #[test]
    fn pixel_budget_is_enforced() {
        let s = surface(100, 100, Vec::new());
        let result = rasterize(&s, &ResolvedMedia::default(), &BlockTypeface, 2, 39_999);
        assert!(matches!(
            result,
            Err(RasterizationError::TooLarge {
                width: 200,
                height: 200,
                max_pixels: 39_999
            })
        ));
    }

    #[test]
    fn overlong_edge_is_refused_before_painting() {
        // Well inside the pixel budget, but too tall to embed as one image
        let s = surface(320, 70_000, Vec::new());
        let result = rasterize(&s, &ResolvedMedia::default(), &BlockTypeface, 1, u64::MAX);
        assert!(matches!(
            result,
            Err(RasterizationError::EdgeTooLong {
                width: 320,
                height: 70_000,
                max_edge: MAX_EDGE
            })
        ));
    }

    #[test]
    fn edge_limit_applies_after_scaling() {
        let s = surface(400, 40_000, Vec::new());
        assert!(matches!(
            rasterize(&s, &ResolvedMedia::default(), &BlockTypeface, 2, u64::MAX),
            Err(RasterizationError::EdgeTooLong { height: 80_000, .. })
        ));
    }

    // =========================================================================
    // Painting
    // =========================================================================

    #[test]
    fn fills_are_scaled() {
        let s = surface(
            100,
            100,
            vec![Block::Fill {
                rect: Rect::new(10.0, 10.0, 20.0, 20.0),
                color: [255, 0, 0],
            }],
        );
        let raster = rasterize(&s, &ResolvedMedia::default(), &BlockTypeface, 2, u64::MAX).unwrap();
        assert_eq!(raster.pixel(20, 20), [255, 0, 0]);
        assert_eq!(raster.pixel(59, 59), [255, 0, 0]);
        assert_eq!(raster.pixel(60, 60), WHITE);
    }

    #[test]
    fn text_is_painted() {
        let s = surface(
            100,
            40,
            vec![Block::Text(TextRun {
                text: "Hi".into(),
                x: 10.0,
                baseline: 30.0,
                size: 20.0,
                color: [0, 0, 0],
            })],
        );
        let raster = rasterize(&s, &ResolvedMedia::default(), &BlockTypeface, 1, u64::MAX).unwrap();
        // First block glyph spans x 10..18.8, y 16..30.
        assert_eq!(raster.pixel(14, 25), [0, 0, 0]);
    }

    #[test]
    fn loaded_media_is_drawn_into_its_box() {
        let s = surface(
            100,
            100,
            vec![media_box("https://img/a.png", MediaKind::Photo, Rect::new(0.0, 0.0, 50.0, 50.0))],
        );
        let media: ResolvedMedia = [loaded("https://img/a.png", [0, 0, 255])].into_iter().collect();
        let raster = rasterize(&s, &media, &BlockTypeface, 2, u64::MAX).unwrap();
        assert!(close_to(raster.pixel(50, 50), [0, 0, 255]));
        assert_eq!(raster.pixel(150, 150), WHITE);
    }

    #[test]
    fn unresolved_media_prints_placeholder() {
        let s = surface(
            100,
            100,
            vec![media_box(
                "https://img/missing.png",
                MediaKind::Photo,
                Rect::new(0.0, 0.0, 50.0, 50.0),
            )],
        );
        let raster = rasterize(&s, &ResolvedMedia::default(), &BlockTypeface, 1, u64::MAX).unwrap();
        assert_eq!(raster.pixel(25, 25), GREY);
    }

    #[test]
    fn video_boxes_get_a_play_badge() {
        let s = surface(
            200,
            120,
            vec![media_box(
                "https://youtu.be/abc",
                MediaKind::Video,
                Rect::new(0.0, 0.0, 200.0, 120.0),
            )],
        );
        let raster = rasterize(&s, &ResolvedMedia::default(), &BlockTypeface, 1, u64::MAX).unwrap();
        assert_eq!(raster.pixel(100, 60), [255, 255, 255]);
        assert_eq!(raster.pixel(5, 5), GREY);
    }

    #[test]
    fn link_code_is_painted_at_scale() {
        let code = LinkCode::encode(
            "https://guide.example/v",
            Rect::new(10.0, 10.0, 100.0, 100.0),
            [0, 0, 0],
        )
        .unwrap();
        let module = code.module_size();
        let s = surface(120, 120, vec![Block::Code(code)]);
        let raster = rasterize(&s, &ResolvedMedia::default(), &BlockTypeface, 2, u64::MAX).unwrap();
        let ring = ((10.0 + module * 0.5) * 2.0) as u32;
        assert_eq!(raster.pixel(ring, ring), [0, 0, 0]);
        assert_eq!(raster.pixel(10, 10), WHITE);
    }

    #[test]
    fn later_blocks_paint_over_earlier_ones() {
        let s = surface(
            50,
            50,
            vec![
                Block::Fill {
                    rect: Rect::new(0.0, 0.0, 50.0, 50.0),
                    color: [255, 0, 0],
                },
                Block::Fill {
                    rect: Rect::new(0.0, 0.0, 10.0, 10.0),
                    color: [0, 255, 0],
                },
            ],
        );
        let raster = rasterize(&s, &ResolvedMedia::default(), &BlockTypeface, 1, u64::MAX).unwrap();
        assert_eq!(raster.pixel(5, 5), [0, 255, 0]);
        assert_eq!(raster.pixel(20, 20), [255, 0, 0]);
    }
}
