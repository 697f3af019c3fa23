//! Concurrent media probes with a single fan-in barrier.
//!
//! Every distinct URL in a [`MediaManifest`] gets exactly one probe. A probe
//! fetches the bytes through the injected [`MediaLoader`] and decodes them
//! with the `image` crate. Failures (transport, status, decode, timeout) are
//! logged and settle as [`MediaAsset::Placeholder`]; [`MediaResolver::resolve_all`]
//! itself never fails.
//!
//! All probes are futures joined on the calling task, so there is no shared
//! mutable state between them: each returns its own [`ResolvedAsset`], and the
//! results are collected once every probe has settled.

use super::loader::{MediaLoader, MediaProbeFailure};
use super::thumbnail::thumbnail_url;
use super::{MediaManifest, MediaRef};
use crate::model::MediaKind;
use futures_util::future::join_all;
use image::DynamicImage;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

/// What the rasterizer paints for one media reference.
#[derive(Debug, Clone)]
pub enum MediaAsset {
    Loaded(Arc<DynamicImage>),
    Placeholder,
}

impl MediaAsset {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Outcome of one probe.
#[derive(Debug, Clone)]
pub struct ResolvedAsset {
    /// URL as referenced by the content.
    pub source_url: String,
    /// URL actually fetched (differs for videos).
    pub resolved_url: String,
    pub asset: MediaAsset,
    pub failure: Option<MediaProbeFailure>,
}

/// All settled probes of one manifest, keyed by source URL.
#[derive(Debug, Clone, Default)]
pub struct ResolvedMedia {
    assets: HashMap<String, ResolvedAsset>,
}

impl ResolvedMedia {
    pub fn get(&self, source_url: &str) -> Option<&ResolvedAsset> {
        self.assets.get(source_url)
    }

    /// The decoded image for `source_url`, if its probe succeeded.
    pub fn image(&self, source_url: &str) -> Option<&Arc<DynamicImage>> {
        match &self.assets.get(source_url)?.asset {
            MediaAsset::Loaded(image) => Some(image),
            MediaAsset::Placeholder => None,
        }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn loaded_count(&self) -> usize {
        self.assets.values().filter(|a| a.asset.is_loaded()).count()
    }

    pub fn placeholder_count(&self) -> usize {
        self.len() - self.loaded_count()
    }

    /// Original URL to fetched URL, for every entry.
    pub fn resolved_thumbnails(&self) -> BTreeMap<String, String> {
        self.assets
            .values()
            .map(|a| (a.source_url.clone(), a.resolved_url.clone()))
            .collect()
    }

    /// Summary for CLI output, sorted by source URL.
    pub fn report(&self) -> MediaReport {
        let mut failures: Vec<FailedProbe> = self
            .assets
            .values()
            .filter_map(|a| {
                a.failure.as_ref().map(|f| FailedProbe {
                    source_url: a.source_url.clone(),
                    reason: f.to_string(),
                })
            })
            .collect();
        failures.sort_by(|a, b| a.source_url.cmp(&b.source_url));
        MediaReport {
            total: self.len(),
            loaded: self.loaded_count(),
            placeholders: self.placeholder_count(),
            failures,
        }
    }
}

impl FromIterator<ResolvedAsset> for ResolvedMedia {
    fn from_iter<I: IntoIterator<Item = ResolvedAsset>>(iter: I) -> Self {
        let assets = iter
            .into_iter()
            .map(|asset| (asset.source_url.clone(), asset))
            .collect();
        Self { assets }
    }
}

/// Serializable probe summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaReport {
    pub total: usize,
    pub loaded: usize,
    pub placeholders: usize,
    pub failures: Vec<FailedProbe>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedProbe {
    pub source_url: String,
    pub reason: String,
}

/// Runs one probe per manifest entry and waits for all of them.
pub struct MediaResolver {
    loader: Arc<dyn MediaLoader>,
    probe_timeout: Duration,
    proxy_endpoint: String,
}

impl MediaResolver {
    pub fn new(
        loader: Arc<dyn MediaLoader>,
        probe_timeout: Duration,
        proxy_endpoint: &str,
    ) -> Self {
        Self {
            loader,
            probe_timeout,
            proxy_endpoint: proxy_endpoint.to_string(),
        }
    }

    /// Probe every entry concurrently; returns once all have settled.
    pub async fn resolve_all(&self, manifest: &MediaManifest) -> ResolvedMedia {
        if manifest.is_empty() {
            return ResolvedMedia::default();
        }
        log::debug!("Probing {} media references", manifest.len());

        let probes = manifest.entries().iter().map(|entry| self.probe(entry));
        let settled = join_all(probes).await;
        let resolved: ResolvedMedia = settled.into_iter().collect();

        log::info!(
            "Media settled: {} loaded, {} placeholders",
            resolved.loaded_count(),
            resolved.placeholder_count()
        );
        resolved
    }

    /// The URL to fetch for `entry`: the thumbnail for videos, else itself.
    pub fn fetch_url(&self, entry: &MediaRef) -> String {
        match entry.kind {
            MediaKind::Photo => entry.url.clone(),
            MediaKind::Video => thumbnail_url(&entry.url, &self.proxy_endpoint),
        }
    }

    async fn probe(&self, entry: &MediaRef) -> ResolvedAsset {
        let resolved_url = self.fetch_url(entry);
        let fetch = self.loader.fetch(&resolved_url);
        let outcome = match tokio::time::timeout(self.probe_timeout, fetch).await {
            Ok(Ok(bytes)) => decode(&resolved_url, &bytes),
            Ok(Err(failure)) => Err(failure),
            Err(_) => Err(MediaProbeFailure::TimedOut {
                url: resolved_url.clone(),
                timeout_ms: self.probe_timeout.as_millis() as u64,
            }),
        };

        let (asset, failure) = match outcome {
            Ok(image) => {
                log::debug!(
                    "Loaded {} ({}x{})",
                    resolved_url,
                    image.width(),
                    image.height()
                );
                (MediaAsset::Loaded(Arc::new(image)), None)
            }
            Err(failure) => {
                log::warn!("Media unavailable, printing placeholder: {failure}");
                (MediaAsset::Placeholder, Some(failure))
            }
        };

        ResolvedAsset {
            source_url: entry.url.clone(),
            resolved_url,
            asset,
            failure,
        }
    }
}

fn decode(url: &str, bytes: &[u8]) -> Result<DynamicImage, MediaProbeFailure> {
    image::load_from_memory(bytes).map_err(|e| MediaProbeFailure::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
