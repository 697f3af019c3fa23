//! Export configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a user config file only needs the keys it overrides.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [surface]
//! width = 1000              # Content surface width in pixels
//! padding = 48              # Outer padding in pixels
//! section_gap = 40          # Vertical space between sections
//!
//! [surface.colors]
//! background = "#ffffff"
//! text = "#1d1d1f"
//! text_muted = "#6e6e73"
//! accent = "#0f6e6e"        # Section headings, header band
//! card = "#f4f4f2"          # Card and placeholder backgrounds
//!
//! [raster]
//! scale = 2                 # Integer upscale factor for legibility
//! max_pixels = 120000000    # Refuse to allocate rasters larger than this
//!
//! [page]
//! format = "a4"             # a3 | a4 | a5 | letter | legal
//! orientation = "portrait"  # portrait | landscape
//! jpeg_quality = 85         # Quality of the embedded page image (1-100)
//!
//! [media]
//! probe_timeout_ms = 4000   # Per-asset load bound; slower assets become placeholders
//! proxy_endpoint = "http://localhost:3000/proxy"
//! user_agent = "guidebook-print"
//!
//! [brand]
//! name = "Guidebook"        # Shown in the header when no logo is configured
//! # logo_url = "https://example.com/logo.png"
//!
//! [welcome]
//! link_code = true          # Scannable code for the guidebook link, drawn locally
//! static_map_template = ""  # Remote static map image URL; empty leaves the map out
//! ```
//!
//! The static map is the only welcome element fetched over the network, so
//! it stays off until a template is configured, for example
//! `"https://staticmap.openstreetmap.de/staticmap.php?center={lat},{lon}&zoom=15&size=900x320"`.
//! Unknown keys are rejected to catch typos early.

use crate::paginate::{Orientation, PageFormat, PaperSize};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Export configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Content surface geometry and colors.
    pub surface: SurfaceConfig,
    /// Raster capture settings.
    pub raster: RasterConfig,
    /// Output page format.
    pub page: PageConfig,
    /// Media probe settings.
    pub media: MediaConfig,
    /// Header branding.
    pub brand: BrandConfig,
    /// Generated welcome-page media.
    pub welcome: WelcomeConfig,
}

impl ExportConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.surface.width < 320 {
            return Err(ConfigError::Validation(
                "surface.width must be at least 320".into(),
            ));
        }
        if self.surface.padding * 4 >= self.surface.width {
            return Err(ConfigError::Validation(
                "surface.padding is too large for surface.width".into(),
            ));
        }
        if !(1..=8).contains(&self.raster.scale) {
            return Err(ConfigError::Validation(
                "raster.scale must be 1-8".into(),
            ));
        }
        if self.raster.max_pixels == 0 {
            return Err(ConfigError::Validation(
                "raster.max_pixels must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.page.jpeg_quality) {
            return Err(ConfigError::Validation(
                "page.jpeg_quality must be 1-100".into(),
            ));
        }
        if self.media.probe_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "media.probe_timeout_ms must be non-zero".into(),
            ));
        }
        for (key, color) in self.surface.colors.entries() {
            parse_hex_color(color).ok_or_else(|| {
                ConfigError::Validation(format!(
                    "surface.colors.{key} is not a #rgb or #rrggbb color: {color}"
                ))
            })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurfaceConfig {
    pub width: u32,
    pub padding: u32,
    pub section_gap: u32,
    pub colors: ColorScheme,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            padding: 48,
            section_gap: 40,
            colors: ColorScheme::default(),
        }
    }
}

/// Surface color scheme, as CSS-style hex strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Secondary text (captions, addresses, ratings).
    pub text_muted: String,
    /// Section headings and the header band.
    pub accent: String,
    /// Card and placeholder backgrounds.
    pub card: String,
}

impl ColorScheme {
    fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("background", &self.background),
            ("text", &self.text),
            ("text_muted", &self.text_muted),
            ("accent", &self.accent),
            ("card", &self.card),
        ]
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#1d1d1f".to_string(),
            text_muted: "#6e6e73".to_string(),
            accent: "#0f6e6e".to_string(),
            card: "#f4f4f2".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RasterConfig {
    /// Integer upscale applied when capturing the surface.
    pub scale: u32,
    /// Upper bound on `width * height` of the capture.
    pub max_pixels: u64,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            scale: 2,
            max_pixels: 120_000_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    pub format: PaperSize,
    pub orientation: Orientation,
    pub jpeg_quality: u8,
}

impl PageConfig {
    pub fn page_format(&self) -> PageFormat {
        PageFormat::new(self.format, self.orientation)
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            format: PaperSize::A4,
            orientation: Orientation::Portrait,
            jpeg_quality: 85,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaConfig {
    /// Per-probe bound in milliseconds. A probe that exceeds it settles as a placeholder.
    pub probe_timeout_ms: u64,
    /// Same-origin relay for media that has no known thumbnail convention.
    pub proxy_endpoint: String,
    pub user_agent: String,
}

impl MediaConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 4000,
            proxy_endpoint: "http://localhost:3000/proxy".to_string(),
            user_agent: concat!("guidebook-print/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrandConfig {
    pub name: String,
    pub logo_url: Option<String>,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            name: "Guidebook".to_string(),
            logo_url: None,
        }
    }
}

/// Welcome-page elements derived from the model.
///
/// In `static_map_template`, `{lat}` and `{lon}` are replaced by the
/// property coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WelcomeConfig {
    /// Draw a scannable code for `guidebook_url`.
    pub link_code: bool,
    pub static_map_template: String,
}

impl WelcomeConfig {
    /// Static map image URL centered on the coordinates, if a template is configured.
    pub fn static_map_url(&self, lat: f64, lon: f64) -> Option<String> {
        let template = self.static_map_template.trim();
        (!template.is_empty()).then(|| {
            template
                .replace("{lat}", &format!("{lat:.6}"))
                .replace("{lon}", &format!("{lon:.6}"))
        })
    }
}

impl Default for WelcomeConfig {
    fn default() -> Self {
        Self {
            link_code: true,
            static_map_template: String::new(),
        }
    }
}

/// Parse `#rgb` or `#rrggbb` into RGB components.
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim().strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = channel(&c.to_string())?;
                rgb[i] = v * 17;
            }
            Some(rgb)
        }
        6 => Some([
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
        ]),
        _ => None,
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ExportConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file and resolve it over the stock defaults.
///
/// `None` (no `--config` given) yields the validated stock defaults.
pub fn load_config(path: Option<&Path>) -> Result<ExportConfig, ConfigError> {
    let overlay = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        }
        None => None,
    };
    resolve_config(stock_defaults_value(), overlay)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ExportConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ExportConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// A documented stock `config.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# guidebook-print configuration
# All options are optional. Values shown are the defaults.

[surface]
# Width of the content surface in pixels. Pages are scaled to this width.
width = 1000
# Outer padding around all content, in pixels.
padding = 48
# Vertical space between sections, in pixels.
section_gap = 40

[surface.colors]
background = "#ffffff"
text = "#1d1d1f"
# Captions, addresses and ratings.
text_muted = "#6e6e73"
# Section headings and the header band.
accent = "#0f6e6e"
# Card and placeholder backgrounds.
card = "#f4f4f2"

[raster]
# Integer upscale factor used when capturing the surface. Every page shares
# this one capture, so low values blur text on every page.
scale = 2
# Refuse to allocate a capture with more pixels than this.
max_pixels = 120000000

[page]
# a3 | a4 | a5 | letter | legal
format = "a4"
# portrait | landscape
orientation = "portrait"
# Quality of the page image embedded in the PDF (1-100).
jpeg_quality = 85

[media]
# Upper bound for loading one asset. Slower assets print as placeholders.
probe_timeout_ms = 4000
# Relay for video links without a known thumbnail convention.
proxy_endpoint = "http://localhost:3000/proxy"

[brand]
# Shown in the page header when no logo_url is set.
name = "Guidebook"
# logo_url = "https://example.com/logo.png"

[welcome]
# Scannable code for the guidebook link, drawn without any network access.
link_code = true
# Static map image fetched from a remote service. {lat} and {lon} are
# replaced by the property coordinates. Empty leaves the map out.
# static_map_template = "https://staticmap.openstreetmap.de/staticmap.php?center={lat},{lon}&zoom=15&size=900x320"
static_map_template = ""
"##
}
