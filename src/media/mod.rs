//! Media resolution: turning the URLs a surface references into decoded
//! images, or placeholders, before rasterization.
//!
//! ## Modules
//!
//! - [`thumbnail`]: static thumbnail URLs for video references
//! - [`loader`]: the [`MediaLoader`] transport seam and its HTTP implementation
//! - [`resolver`]: concurrent probes with one fan-in barrier

pub mod loader;
pub mod resolver;
pub mod thumbnail;

pub use loader::{HttpLoader, MediaLoader, MediaProbeFailure};
pub use resolver::{MediaAsset, MediaReport, MediaResolver, ResolvedAsset, ResolvedMedia};
pub use thumbnail::thumbnail_url;

use crate::model::MediaKind;
use serde::Serialize;

/// One media reference of a surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaRef {
    pub url: String,
    pub kind: MediaKind,
}

/// The distinct media references a surface needs, in first-use order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaManifest {
    entries: Vec<MediaRef>,
}

impl MediaManifest {
    /// Add `url` unless already present. Blank URLs are ignored.
    /// Returns whether an entry was added.
    pub fn push(&mut self, url: &str, kind: MediaKind) -> bool {
        let url = url.trim();
        if url.is_empty() || self.contains(url) {
            return false;
        }
        self.entries.push(MediaRef {
            url: url.to_string(),
            kind,
        });
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.iter().any(|e| e.url == url)
    }

    pub fn entries(&self) -> &[MediaRef] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn video_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.kind == MediaKind::Video)
            .count()
    }
}
