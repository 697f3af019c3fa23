//! # Guidebook Print
//!
//! Turns one vacation-rental guidebook (property details, check-in and
//! check-out instructions, equipment manual, nearby places) into a
//! print-ready, image-per-page PDF.
//!
//! # Architecture: Capture Once, Slice Into Pages
//!
//! ```text
//! 1. Layout     ContentModel   →  ContentSurface   (sections, blocks, media manifest)
//! 2. Resolve    MediaManifest  →  ResolvedMedia    (concurrent probes, one barrier)
//! 3. Rasterize  surface+media  →  RasterImage      (one tall capture at 2x)
//! 4. Paginate   RasterImage    →  <name>.pdf       (one shared image, N page windows)
//! ```
//!
//! The [`export::ExportController`] runs these stages as a small state
//! machine and guarantees at most one export in flight.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`model`] | Read-only guidebook content, deserialized from JSON |
//! | [`surface`] | Section presence and order, block layout, media manifest |
//! | [`media`] | Video thumbnails, the loader seam, concurrent probes |
//! | [`raster`] | Painting a surface into an RGB raster, typefaces |
//! | [`paginate`] | Page plan and PDF assembly with `lopdf` |
//! | [`export`] | Export state machine, busy guard, ready gate |
//! | [`config`] | `config.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Raster, Many Windows
//!
//! The surface is captured as a single image and every page references that
//! same image, shifted up by one page height per page. There are no seams
//! between pages and no per-page re-render, at the cost of text becoming
//! part of the image. PDF text is not selectable.
//!
//! ## Best-Effort Media
//!
//! A missing photo never blocks a guidebook. Each probe that fails, or takes
//! longer than `media.probe_timeout_ms`, prints as a neutral placeholder box
//! and is listed in the export report.
//!
//! ## Same Typeface for Layout and Paint
//!
//! Layout measures text with the exact [`raster::typeface::Typeface`] the
//! rasterizer paints with, so wrapped lines always fit their column.

pub mod config;
pub mod export;
pub mod media;
pub mod model;
pub mod output;
pub mod paginate;
pub mod raster;
pub mod surface;

#[cfg(test)]
pub(crate) mod test_helpers;
