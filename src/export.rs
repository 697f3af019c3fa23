//! Export orchestration: one guidebook in, one PDF artifact out.
//!
//! ```text
//!  Idle ──generate──▶ ResolvingMedia ──▶ Rendering ──▶ Paginating ──▶ Done
//!                          │                 │              │
//!                          └─────────────────┴──────────────┴──────▶ Failed
//! ```
//!
//! After `Done` or `Failed` the controller is back to `Idle`. At most one
//! export runs at a time: calling [`ExportController::generate`] while a job
//! is in flight returns [`ExportError::Busy`] without starting anything.
//! The authoritative state lives in a `tokio::sync::watch` channel, so UI
//! layers can [`subscribe`](ExportController::subscribe) and project a busy
//! indicator from it.
//!
//! Media can be resolved ahead of time with [`ExportController::prepare`];
//! [`ExportController::is_ready`] reports whether that has settled, and
//! `generate` reuses the prepared media when the content still references the
//! same manifest. Running exports cannot be cancelled.

use crate::config::ExportConfig;
use crate::media::{MediaLoader, MediaManifest, MediaReport, MediaResolver, ResolvedMedia};
use crate::model::ContentModel;
use crate::paginate::{PagePlan, PaginationError, assemble_pdf, plan_pages};
use crate::raster::typeface::Typeface;
use crate::raster::{RasterizationError, rasterize};
use crate::surface::{SectionKind, SurfaceStyle, build_surface};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("An export is already in progress")]
    Busy,
    #[error("Rendering failed: {0}")]
    Rasterization(#[from] RasterizationError),
    #[error("Pagination failed: {0}")]
    Pagination(#[from] PaginationError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Export worker stopped: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportState {
    Idle,
    ResolvingMedia,
    Rendering,
    Paginating,
    Done,
    Failed,
}

impl ExportState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ResolvingMedia => "resolving media",
            Self::Rendering => "rendering",
            Self::Paginating => "paginating",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

/// A finished export. Only produced by a job that reached `Done`.
#[derive(Debug, Clone, Serialize)]
pub struct ExportArtifact {
    pub file_name: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub plan: PagePlan,
    /// Capture size in pixels.
    pub raster_size: (u32, u32),
    pub sections: Vec<SectionKind>,
    /// States visited by the job, in order.
    pub transitions: Vec<ExportState>,
    pub media: MediaReport,
    /// Original media URL to the URL actually loaded.
    pub resolved_thumbnails: BTreeMap<String, String>,
}

impl ExportArtifact {
    pub fn page_count(&self) -> usize {
        self.plan.page_count()
    }

    /// Write the PDF into `dir` (created if missing); returns the file path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, std::io::Error> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// `<property name>.pdf`, without path separators or control characters.
pub fn export_file_name(property_name: &str) -> String {
    let cleaned: String = property_name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\') && !c.is_control())
        .collect();
    let stem = cleaned.trim().trim_start_matches('.');
    if stem.is_empty() {
        "guidebook.pdf".to_string()
    } else {
        format!("{stem}.pdf")
    }
}

struct Prepared {
    manifest: MediaManifest,
    media: ResolvedMedia,
}

/// Drives the export state machine for one guidebook at a time.
pub struct ExportController {
    config: ExportConfig,
    style: SurfaceStyle,
    resolver: MediaResolver,
    typeface: Arc<dyn Typeface>,
    state: watch::Sender<ExportState>,
    prepared: Mutex<Option<Prepared>>,
}

impl ExportController {
    pub fn new(
        config: ExportConfig,
        loader: Arc<dyn MediaLoader>,
        typeface: Arc<dyn Typeface>,
    ) -> Self {
        let resolver = MediaResolver::new(
            loader,
            config.media.probe_timeout(),
            &config.media.proxy_endpoint,
        );
        let (state, _) = watch::channel(ExportState::Idle);
        Self {
            style: SurfaceStyle::from_config(&config),
            config,
            resolver,
            typeface,
            state,
            prepared: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ExportState {
        *self.state.borrow()
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<ExportState> {
        self.state.subscribe()
    }

    /// Resolve the media `model` needs ahead of an export.
    pub async fn prepare(&self, model: &ContentModel) {
        let surface = build_surface(model, &self.style, self.typeface.as_ref());
        let media = self.resolver.resolve_all(&surface.media).await;
        *self.prepared.lock().unwrap_or_else(PoisonError::into_inner) = Some(Prepared {
            manifest: surface.media,
            media,
        });
    }

    /// Whether prepared media has settled.
    pub fn is_ready(&self) -> bool {
        self.prepared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Run one export job to completion.
    pub async fn generate(&self, model: &ContentModel) -> Result<ExportArtifact, ExportError> {
        let mut job = self.begin()?;
        match self.run(&mut job, model).await {
            Ok(mut artifact) => {
                job.advance(ExportState::Done);
                artifact.transitions = job.transitions.clone();
                log::info!(
                    "Exported {} ({} pages, {} KiB)",
                    artifact.file_name,
                    artifact.page_count(),
                    artifact.bytes.len() / 1024
                );
                Ok(artifact)
            }
            Err(e) => {
                job.advance(ExportState::Failed);
                log::error!("Export failed: {e}");
                Err(e)
            }
        }
    }

    /// Claim the controller for a new job, or report it busy.
    fn begin(&self) -> Result<Job<'_>, ExportError> {
        let claimed = self.state.send_if_modified(|state| {
            if *state == ExportState::Idle {
                *state = ExportState::ResolvingMedia;
                true
            } else {
                false
            }
        });
        if !claimed {
            log::warn!("Export requested while {}; ignoring", self.state().label());
            return Err(ExportError::Busy);
        }
        log::info!("Export state: {}", ExportState::ResolvingMedia.label());
        Ok(Job {
            state: &self.state,
            transitions: vec![ExportState::ResolvingMedia],
        })
    }

    /// Rendering and pagination are CPU-bound and run on the blocking pool.
    async fn run(
        &self,
        job: &mut Job<'_>,
        model: &ContentModel,
    ) -> Result<ExportArtifact, ExportError> {
        let surface = build_surface(model, &self.style, self.typeface.as_ref());
        let media = match self.prepared_media(&surface.media) {
            Some(media) => {
                log::debug!("Reusing prepared media");
                media
            }
            None => self.resolver.resolve_all(&surface.media).await,
        };
        let sections = surface.sections.clone();
        let report = media.report();
        let resolved_thumbnails = media.resolved_thumbnails();

        job.advance(ExportState::Rendering);
        let typeface = Arc::clone(&self.typeface);
        let (scale, max_pixels) = (self.config.raster.scale, self.config.raster.max_pixels);
        let raster = task::spawn_blocking(move || {
            rasterize(&surface, &media, typeface.as_ref(), scale, max_pixels)
        })
        .await??;

        job.advance(ExportState::Paginating);
        let format = self.config.page.page_format();
        let quality = self.config.page.jpeg_quality;
        let title = match model.property.name.trim() {
            "" => self.config.brand.name.clone(),
            name => name.to_string(),
        };
        let raster_size = (raster.width(), raster.height());
        let (plan, bytes) = task::spawn_blocking(move || {
            let plan = plan_pages(raster.width(), raster.height(), format)?;
            let bytes = assemble_pdf(&raster, &plan, quality, &title)?;
            Ok::<_, PaginationError>((plan, bytes))
        })
        .await??;

        Ok(ExportArtifact {
            file_name: export_file_name(&model.property.name),
            bytes,
            plan,
            raster_size,
            sections,
            transitions: Vec::new(),
            media: report,
            resolved_thumbnails,
        })
    }

    fn prepared_media(&self, manifest: &MediaManifest) -> Option<ResolvedMedia> {
        let prepared = self.prepared.lock().unwrap_or_else(PoisonError::into_inner);
        prepared
            .as_ref()
            .filter(|p| p.manifest == *manifest)
            .map(|p| p.media.clone())
    }
}

/// An in-flight export. Returns the controller to `Idle` when dropped.
struct Job<'a> {
    state: &'a watch::Sender<ExportState>,
    transitions: Vec<ExportState>,
}

impl Job<'_> {
    fn advance(&mut self, next: ExportState) {
        log::info!("Export state: {}", next.label());
        self.state.send_replace(next);
        self.transitions.push(next);
    }
}

impl Drop for Job<'_> {
    fn drop(&mut self) {
        self.state.send_replace(ExportState::Idle);
    }
}
