//! The content surface: a fixed-width, top-to-bottom composition of every
//! present guidebook section, ready to be captured as one tall raster.
//!
//! Building a surface is pure. It measures text with the same
//! [`Typeface`](crate::raster::typeface::Typeface) the rasterizer paints
//! with, and records every image it references in a [`MediaManifest`]
//! instead of fetching anything.
//!
//! ## Modules
//!
//! - [`sections`]: presence and order of sections
//! - [`layout`]: block placement, text wrapping, surface height

pub mod layout;
pub mod sections;

pub use layout::build_surface;
pub use sections::{PlaceCategory, Section, SectionKind, plan_sections};

use crate::config::{ColorScheme, ExportConfig, WelcomeConfig, parse_hex_color};
use crate::media::MediaManifest;
use crate::model::MediaKind;
use qrcode::QrCode;
use serde::Serialize;

/// Axis-aligned box in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// One line of text, already wrapped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub baseline: f32,
    pub size: f32,
    pub color: [u8; 3],
}

/// An image slot filled from resolved media.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaBox {
    pub rect: Rect,
    /// Source URL, as listed in the surface's manifest.
    pub url: String,
    pub kind: MediaKind,
}

/// A scannable code for a link, encoded at layout time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkCode {
    /// The module grid, quiet zone excluded.
    pub rect: Rect,
    /// Modules per side.
    pub modules: usize,
    /// Row-major module colors, `true` for dark.
    #[serde(skip)]
    pub dark: Vec<bool>,
    pub color: [u8; 3],
}

impl LinkCode {
    /// Encode `link` into `rect`. `None` when the link is too long for any
    /// code version.
    pub fn encode(link: &str, rect: Rect, color: [u8; 3]) -> Option<Self> {
        let code = match QrCode::new(link.as_bytes()) {
            Ok(code) => code,
            Err(e) => {
                log::warn!("No scannable code for {link}: {e}");
                return None;
            }
        };
        let dark = code
            .to_colors()
            .into_iter()
            .map(|module| module == qrcode::Color::Dark)
            .collect();
        Some(Self {
            rect,
            modules: code.width(),
            dark,
            color,
        })
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.modules && self.dark.get(y * self.modules + x).copied().unwrap_or(false)
    }

    /// Side of one module in surface pixels.
    pub fn module_size(&self) -> f32 {
        self.rect.width / self.modules.max(1) as f32
    }
}

/// A paint instruction. Painted in order, later blocks over earlier ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Fill { rect: Rect, color: [u8; 3] },
    Text(TextRun),
    Media(MediaBox),
    Code(LinkCode),
}

/// A laid-out guidebook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentSurface {
    pub width: u32,
    pub height: u32,
    pub background: [u8; 3],
    /// Fill for media slots whose probe failed.
    pub placeholder: [u8; 3],
    pub blocks: Vec<Block>,
    pub sections: Vec<SectionKind>,
    pub media: MediaManifest,
}

impl ContentSurface {
    pub fn media_boxes(&self) -> impl Iterator<Item = &MediaBox> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Media(media) => Some(media),
            _ => None,
        })
    }

    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Text(run) => Some(run),
            _ => None,
        })
    }

    pub fn link_codes(&self) -> impl Iterator<Item = &LinkCode> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Code(code) => Some(code),
            _ => None,
        })
    }
}

/// Resolved colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: [u8; 3],
    pub text: [u8; 3],
    pub text_muted: [u8; 3],
    pub accent: [u8; 3],
    pub card: [u8; 3],
}

impl Palette {
    /// Parse a color scheme, falling back to the stock color for any
    /// entry that does not parse.
    pub fn from_scheme(scheme: &ColorScheme) -> Self {
        let stock = ColorScheme::default();
        let pick = |value: &str, fallback: &str| {
            parse_hex_color(value)
                .or_else(|| parse_hex_color(fallback))
                .unwrap_or([0, 0, 0])
        };
        Self {
            background: pick(&scheme.background, &stock.background),
            text: pick(&scheme.text, &stock.text),
            text_muted: pick(&scheme.text_muted, &stock.text_muted),
            accent: pick(&scheme.accent, &stock.accent),
            card: pick(&scheme.card, &stock.card),
        }
    }
}

/// Everything layout needs from the configuration.
#[derive(Debug, Clone)]
pub struct SurfaceStyle {
    pub width: u32,
    pub padding: u32,
    pub section_gap: u32,
    pub palette: Palette,
    pub brand_name: String,
    pub logo_url: Option<String>,
    pub welcome: WelcomeConfig,
}

impl SurfaceStyle {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            width: config.surface.width,
            padding: config.surface.padding,
            section_gap: config.surface.section_gap,
            palette: Palette::from_scheme(&config.surface.colors),
            brand_name: config.brand.name.clone(),
            logo_url: config
                .brand
                .logo_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
            welcome: config.welcome.clone(),
        }
    }
}

impl Default for SurfaceStyle {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}
