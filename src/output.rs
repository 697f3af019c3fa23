//! CLI output formatting for `check` and `export`.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Sections
//! 001 Welcome
//! 002 Check-In
//!
//! Media
//! 001 photo https://media.example/villa-azur/front.jpg
//! 002 video https://youtu.be/abc123
//!     Thumbnail: https://img.youtube.com/vi/abc123/hqdefault.jpg
//!
//! Surface
//!     1000x1077 px, 1 page
//! ```
//!
//! ## Export
//!
//! ```text
//! Sections
//! 001 Welcome
//! 002 Check-In
//!
//! Media
//!     1 loaded, 1 placeholder
//!     Placeholder: https://media.example/gone.jpg
//!         https://media.example/gone.jpg answered HTTP 404
//!
//! Pages
//!     1 page (2000x2154 px capture)
//!
//! Wrote dist/Villa Azur.pdf
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::export::ExportArtifact;
use crate::media::{MediaReport, thumbnail_url};
use crate::model::MediaKind;
use crate::paginate::PagePlan;
use crate::surface::{ContentSurface, SectionKind};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

fn format_sections(sections: &[SectionKind]) -> Vec<String> {
    let mut lines = vec!["Sections".to_string()];
    for (i, section) in sections.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), section.title()));
    }
    lines
}

// ============================================================================
// Check
// ============================================================================

/// Format the plan of a surface: sections, media references, page estimate.
pub fn format_check_output(
    surface: &ContentSurface,
    plan: &PagePlan,
    proxy_endpoint: &str,
) -> Vec<String> {
    let mut lines = format_sections(&surface.sections);

    lines.push(String::new());
    lines.push("Media".to_string());
    if surface.media.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, entry) in surface.media.entries().iter().enumerate() {
        let kind = match entry.kind {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
        };
        lines.push(format!("{} {} {}", format_index(i + 1), kind, entry.url));
        if entry.kind == MediaKind::Video {
            lines.push(format!(
                "{}Thumbnail: {}",
                indent(1),
                thumbnail_url(&entry.url, proxy_endpoint)
            ));
        }
    }

    lines.push(String::new());
    lines.push("Surface".to_string());
    lines.push(format!(
        "{}{}x{} px, {}",
        indent(1),
        surface.width,
        surface.height,
        plural(plan.page_count(), "page", "pages")
    ));
    lines
}

pub fn print_check_output(surface: &ContentSurface, plan: &PagePlan, proxy_endpoint: &str) {
    for line in format_check_output(surface, plan, proxy_endpoint) {
        println!("{}", line);
    }
}

// ============================================================================
// Export
// ============================================================================

/// Format the probe summary with one entry per failed probe.
pub fn format_media_report(report: &MediaReport) -> Vec<String> {
    let mut lines = vec!["Media".to_string()];
    if report.total == 0 {
        lines.push(format!("{}(none)", indent(1)));
        return lines;
    }
    lines.push(format!(
        "{}{} loaded, {}",
        indent(1),
        report.loaded,
        plural(report.placeholders, "placeholder", "placeholders")
    ));
    for failure in &report.failures {
        lines.push(format!("{}Placeholder: {}", indent(1), failure.source_url));
        lines.push(format!("{}{}", indent(2), failure.reason));
    }
    lines
}

/// Format a finished export and where it was written.
pub fn format_export_output(artifact: &ExportArtifact, path: &Path) -> Vec<String> {
    let mut lines = format_sections(&artifact.sections);
    lines.push(String::new());
    lines.extend(format_media_report(&artifact.media));
    lines.push(String::new());
    lines.push("Pages".to_string());
    let (width, height) = artifact.raster_size;
    lines.push(format!(
        "{}{} ({}x{} px capture)",
        indent(1),
        plural(artifact.page_count(), "page", "pages"),
        width,
        height
    ));
    lines.push(String::new());
    lines.push(format!("Wrote {}", path.display()));
    lines
}

pub fn print_export_output(artifact: &ExportArtifact, path: &Path) {
    for line in format_export_output(artifact, path) {
        println!("{}", line);
    }
}
