//! Pagination: slicing one tall raster into fixed-format PDF pages.
//!
//! ## Strategy
//!
//! The raster is scaled to exactly fill the page width; its height follows
//! proportionally. Every page then shows the *same* full image, shifted up by
//! one page height per page so a different vertical window falls inside the
//! page bounds:
//!
//! ```text
//!   raster (scaled)        page 1          page 2          page 3
//!  ┌──────────────┐      ┌────────┐      ┌────────┐      ┌────────┐
//!  │ 0 .. p       │ ───▶ │ y = 0  │      │        │      │        │
//!  │ p .. 2p      │ ───────────────────▶ │ y = -p │      │        │
//!  │ 2p .. h      │ ──────────────────────────────────▶ │ y = -2p│
//!  └──────────────┘      └────────┘      └────────┘      │ blank  │
//!                                                        └────────┘
//! ```
//!
//! The image is embedded once as a JPEG XObject and referenced from each
//! page's content stream, so there are no per-slice re-encodes and no seams
//! between slices. All pages share one base raster, which is why the capture
//! scale matters for legibility on every page.
//!
//! ## Page count
//!
//! `remaining` starts at the scaled image height and is decremented by the
//! page height after each page; a new page is appended while `remaining > 0`.
//! The result is `ceil(scaled_height / page_height)`, and an exact multiple
//! never yields a trailing blank page.

use crate::raster::{MAX_EDGE, RasterImage};
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Remaining heights at or below this many points count as "no content left".
///
/// Scaling by `page_width / raster_width` is inexact in floating point; this
/// keeps an exact multiple of the page height from spilling onto a blank page.
const PAGE_EPSILON: f64 = 1e-6;

const POINTS_PER_MM: f64 = 72.0 / 25.4;

#[derive(Error, Debug)]
pub enum PaginationError {
    #[error("Raster has no area ({width}x{height})")]
    EmptyRaster { width: u32, height: u32 },
    #[error("Raster {width}x{height} exceeds the embeddable image size")]
    RasterTooLarge { width: u32, height: u32 },
    #[error("Page image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("PDF assembly failed: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

impl PaperSize {
    /// Portrait dimensions in PDF points.
    fn portrait_points(self) -> (f64, f64) {
        match self {
            Self::A3 => (297.0 * POINTS_PER_MM, 420.0 * POINTS_PER_MM),
            Self::A4 => (210.0 * POINTS_PER_MM, 297.0 * POINTS_PER_MM),
            Self::A5 => (148.0 * POINTS_PER_MM, 210.0 * POINTS_PER_MM),
            Self::Letter => (612.0, 792.0),
            Self::Legal => (612.0, 1008.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// A target page format, in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFormat {
    pub width: f64,
    pub height: f64,
}

impl PageFormat {
    pub fn new(size: PaperSize, orientation: Orientation) -> Self {
        let (w, h) = size.portrait_points();
        match orientation {
            Orientation::Portrait => Self {
                width: w,
                height: h,
            },
            Orientation::Landscape => Self {
                width: h,
                height: w,
            },
        }
    }

    pub fn a4_portrait() -> Self {
        Self::new(PaperSize::A4, Orientation::Portrait)
    }
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::a4_portrait()
    }
}

/// Where the shared page image sits on every page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagePlan {
    pub page_width: f64,
    pub page_height: f64,
    /// Height of the whole raster once scaled to page width.
    pub image_height: f64,
    /// Per-page `yOffset`: page `i` draws the image shifted up by `offsets[i]`.
    pub offsets: Vec<f64>,
}

impl PagePlan {
    pub fn page_count(&self) -> usize {
        self.offsets.len()
    }

    /// Height of unique content visible on page `index` (the last page may be partial).
    pub fn content_height(&self, index: usize) -> f64 {
        self.offsets
            .get(index)
            .map(|offset| (self.image_height - offset).clamp(0.0, self.page_height))
            .unwrap_or(0.0)
    }
}

/// Compute the page plan for a raster of the given pixel size.
pub fn plan_pages(
    raster_width: u32,
    raster_height: u32,
    format: PageFormat,
) -> Result<PagePlan, PaginationError> {
    if raster_width == 0 || raster_height == 0 {
        return Err(PaginationError::EmptyRaster {
            width: raster_width,
            height: raster_height,
        });
    }
    let image_height = raster_height as f64 * (format.width / raster_width as f64);
    Ok(PagePlan {
        page_width: format.width,
        page_height: format.height,
        image_height,
        offsets: page_offsets(image_height, format.height),
    })
}

/// Offsets of each page window for content `image_height` tall.
///
/// Always yields at least one page; content shorter than a page leaves
/// trailing space on that page.
pub fn page_offsets(image_height: f64, page_height: f64) -> Vec<f64> {
    let mut offsets = vec![0.0];
    let mut remaining = image_height - page_height;
    let mut y_offset = 0.0;
    while remaining > PAGE_EPSILON {
        y_offset += page_height;
        offsets.push(y_offset);
        remaining -= page_height;
    }
    offsets
}

/// Encode the raster once and lay it out on every page of `plan`.
///
/// `title` becomes the document's `/Title` entry.
pub fn assemble_pdf(
    raster: &RasterImage,
    plan: &PagePlan,
    jpeg_quality: u8,
    title: &str,
) -> Result<Vec<u8>, PaginationError> {
    let (width, height) = (raster.width(), raster.height());
    if width == 0 || height == 0 {
        return Err(PaginationError::EmptyRaster { width, height });
    }
    if width > MAX_EDGE || height > MAX_EDGE {
        return Err(PaginationError::RasterTooLarge { width, height });
    }

    let rgb = raster.to_rgb();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, jpeg_quality.clamp(1, 100)).encode(
        rgb.as_raw(),
        width,
        height,
        ExtendedColorType::Rgb8,
    )?;
    log::debug!(
        "Encoded {}x{} page image: {} KiB",
        width,
        height,
        jpeg.len() / 1024
    );

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(width as i64),
            "Height" => Object::Integer(height as i64),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => Object::Integer(8),
            "Filter" => "DCTDecode",
        },
        jpeg,
    )
    .with_compression(false);
    let image_id = doc.add_object(image_stream);
    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! { "Im0" => image_id },
    });

    let page_w = plan.page_width as f32;
    let page_h = plan.page_height as f32;
    let image_h = plan.image_height as f32;
    let mut kids = Vec::with_capacity(plan.page_count());
    for &offset in &plan.offsets {
        // PDF origin is bottom-left: the image's top edge sits `offset` above the page top.
        let bottom = page_h + offset as f32 - image_h;
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        page_w.into(),
                        0i64.into(),
                        0i64.into(),
                        image_h.into(),
                        0i64.into(),
                        bottom.into(),
                    ],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0i64.into(), 0i64.into(), page_w.into(), page_h.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(page_count),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => text_string(title),
        "Producer" => Object::String(
            concat!("guidebook-print ", env!("CARGO_PKG_VERSION")).as_bytes().to_vec(),
            StringFormat::Literal,
        ),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// A PDF text string: PDFDocEncoding-compatible ASCII as is, anything else
/// as UTF-16BE with a byte order mark.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
    Object::String(bytes, StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "expected {b}, got {a}");
    }

    // =========================================================================
    // Page count tests
    // =========================================================================

    #[test]
    fn short_content_is_one_page() {
        assert_eq!(page_offsets(120.0, 800.0), vec![0.0]);
    }

    #[test]
    fn exact_page_height_is_one_page() {
        assert_eq!(page_offsets(800.0, 800.0).len(), 1);
    }

    #[test]
    fn one_unit_over_is_two_pages() {
        assert_eq!(page_offsets(801.0, 800.0), vec![0.0, 800.0]);
    }

    #[test]
    fn exact_multiple_has_no_trailing_blank_page() {
        assert_eq!(page_offsets(2400.0, 800.0).len(), 3);
    }

    #[test]
    fn page_count_is_ceil_of_ratio() {
        let cases: [(f64, f64); 5] = [
            (1.0, 7.0),
            (7.0, 7.0),
            (8.0, 7.0),
            (99.5, 10.0),
            (1000.0, 3.0),
        ];
        for (h, p) in cases {
            let expected = (h / p).ceil() as usize;
            assert_eq!(page_offsets(h, p).len(), expected, "h={h} p={p}");
        }
    }

    #[test]
    fn four_point_two_pages_gives_five() {
        let format = PageFormat::a4_portrait();
        let page = format.height;
        let offsets = page_offsets(4.2 * page, page);
        assert_eq!(offsets.len(), 5);
        for (i, offset) in offsets.iter().enumerate() {
            assert_close(*offset, i as f64 * page);
        }
    }

    #[test]
    fn last_page_holds_only_the_remainder() {
        let plan = PagePlan {
            page_width: 100.0,
            page_height: 100.0,
            image_height: 420.0,
            offsets: page_offsets(420.0, 100.0),
        };
        assert_eq!(plan.page_count(), 5);
        assert_close(plan.content_height(0), 100.0);
        assert_close(plan.content_height(4), 20.0);
        assert_close(plan.content_height(9), 0.0);
    }

    // =========================================================================
    // plan_pages tests
    // =========================================================================

    #[test]
    fn plan_scales_raster_to_page_width() {
        let format = PageFormat {
            width: 500.0,
            height: 700.0,
        };
        let plan = plan_pages(1000, 2000, format).unwrap();
        assert_close(plan.image_height, 1000.0);
        assert_eq!(plan.offsets, vec![0.0, 700.0]);
    }

    #[test]
    fn plan_raster_just_under_one_a4_page() {
        // Rounding up would land a fraction of a point past the page bottom
        let format = PageFormat::a4_portrait();
        let height = (2000.0 * format.height / format.width).floor() as u32;
        let plan = plan_pages(2000, height, format).unwrap();
        assert_eq!(plan.page_count(), 1);
        assert!(plan.image_height <= plan.page_height);
    }

    #[test]
    fn plan_raster_exactly_one_page_at_whole_scale() {
        // 1200 px onto 600 pt halves every dimension exactly
        let format = PageFormat {
            width: 600.0,
            height: 840.0,
        };
        let plan = plan_pages(1200, 1680, format).unwrap();
        assert_close(plan.image_height, plan.page_height);
        assert_eq!(plan.page_count(), 1);
        assert_eq!(plan_pages(1200, 1681, format).unwrap().page_count(), 2);
        assert_eq!(plan_pages(1200, 3360, format).unwrap().page_count(), 2);
    }

    #[test]
    fn plan_rejects_empty_raster() {
        let format = PageFormat::default();
        assert!(matches!(
            plan_pages(0, 100, format),
            Err(PaginationError::EmptyRaster { width: 0, .. })
        ));
        assert!(matches!(
            plan_pages(100, 0, format),
            Err(PaginationError::EmptyRaster { height: 0, .. })
        ));
    }

    #[test]
    fn plan_is_deterministic() {
        let format = PageFormat::a4_portrait();
        assert_eq!(
            plan_pages(2000, 9000, format).unwrap(),
            plan_pages(2000, 9000, format).unwrap()
        );
    }

    // =========================================================================
    // Page format tests
    // =========================================================================

    #[test]
    fn a4_dimensions_in_points() {
        let a4 = PageFormat::a4_portrait();
        assert!((a4.width - 595.28).abs() < 0.01);
        assert!((a4.height - 841.89).abs() < 0.01);
    }

    #[test]
    fn landscape_swaps_dimensions() {
        let portrait = PageFormat::new(PaperSize::Letter, Orientation::Portrait);
        let landscape = PageFormat::new(PaperSize::Letter, Orientation::Landscape);
        assert_eq!(portrait.width, landscape.height);
        assert_eq!(portrait.height, landscape.width);
    }

    // =========================================================================
    // PDF assembly tests
    // =========================================================================

    #[test]
    fn assembled_pdf_has_one_page_per_offset() {
        let raster = RasterImage::filled(200, 900, [200, 30, 30]);
        let format = PageFormat::a4_portrait();
        let plan = plan_pages(raster.width(), raster.height(), format).unwrap();
        assert_eq!(plan.page_count(), 4);

        let bytes = assemble_pdf(&raster, &plan, 80, "Villa Azur").unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 4);
    }

    #[test]
    fn assembled_pdf_embeds_image_once() {
        let raster = RasterImage::filled(100, 500, [0, 0, 0]);
        let plan = plan_pages(100, 500, PageFormat::a4_portrait()).unwrap();
        let bytes = assemble_pdf(&raster, &plan, 80, "t").unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let images = doc
            .objects
            .values()
            .filter(|obj| {
                obj.as_stream()
                    .ok()
                    .and_then(|s| s.dict.get(b"Subtype").ok())
                    .and_then(|s| s.as_name().ok())
                    == Some(b"Image".as_slice())
            })
            .count();
        assert_eq!(images, 1);
    }

    #[test]
    fn ascii_title_is_a_literal_string() {
        assert!(matches!(
            text_string("Villa Azur"),
            Object::String(ref bytes, StringFormat::Literal) if bytes.as_slice() == b"Villa Azur"
        ));
    }

    #[test]
    fn non_ascii_title_is_utf16_with_bom() {
        let raster = RasterImage::filled(100, 100, [255, 255, 255]);
        let plan = plan_pages(100, 100, PageFormat::a4_portrait()).unwrap();
        let bytes = assemble_pdf(&raster, &plan, 80, "Café du Port").unwrap();
        let doc = Document::load_mem(&bytes).unwrap();

        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let title = doc
            .get_dictionary(info_id)
            .unwrap()
            .get(b"Title")
            .unwrap()
            .as_str()
            .unwrap();
        assert_eq!(&title[..2], &[0xFE, 0xFF]);
        let units: Vec<u16> = title[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        assert_eq!(String::from_utf16(&units).unwrap(), "Café du Port");
    }

    #[test]
    fn assemble_rejects_oversized_raster() {
        let raster = RasterImage::filled(1, 70_000, [0, 0, 0]);
        let plan = plan_pages(1, 70_000, PageFormat::a4_portrait()).unwrap();
        assert!(matches!(
            assemble_pdf(&raster, &plan, 80, "t"),
            Err(PaginationError::RasterTooLarge { .. })
        ));
    }
}
