//! Shared test utilities for the guidebook-print test suite.
//!
//! Provides an in-memory [`MediaLoader`], encoded image fixtures, and the
//! reference "Villa Azur" guidebook.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let loader = MockLoader::new()
//!     .with_image("https://img/a.png", png_bytes(4, 4, [255, 0, 0]))
//!     .with_delay(Duration::from_millis(50));
//! let model = villa_azur();
//! ```

use crate::media::{MediaLoader, MediaProbeFailure};
use crate::model::ContentModel;
use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;
use std::time::Duration;
use tiny_skia::{Color, Pixmap};

// =========================================================================
// Media loader
// =========================================================================

/// Serves registered URLs from memory; anything else answers HTTP 404.
#[derive(Default)]
pub struct MockLoader {
    images: HashMap<String, Vec<u8>>,
    delay: Option<Duration>,
    requested: Mutex<Vec<String>>,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.images.insert(url.to_string(), bytes);
        self
    }

    /// Delay every fetch by `delay` (use with paused tokio time).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    /// Every URL fetched so far, in call order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaLoader for MockLoader {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, MediaProbeFailure> {
        self.requested.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| MediaProbeFailure::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

// =========================================================================
// Fixtures
// =========================================================================

/// A solid-color PNG of the given size.
pub fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb(color));
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

/// An opaque canvas filled with `color`.
pub fn blank_canvas(width: u32, height: u32, color: [u8; 3]) -> Pixmap {
    let mut canvas = Pixmap::new(width, height).unwrap();
    canvas.fill(Color::from_rgba8(color[0], color[1], color[2], 255));
    canvas
}

/// The unpremultiplied RGB of one canvas pixel.
pub fn canvas_rgb(canvas: &Pixmap, x: u32, y: u32) -> [u8; 3] {
    let pixel = canvas.pixel(x, y).unwrap().demultiply();
    [pixel.red(), pixel.green(), pixel.blue()]
}

/// One photo, check-in at 14:00, no address, no link, no coordinates.
pub fn villa_azur() -> ContentModel {
    serde_json::from_str(
        r#"{
            "property": {
                "name": "Villa Azur",
                "description": "A quiet villa above the bay, five minutes from the beach.",
                "front_photo_url": "https://media.example/villa-azur/front.jpg",
                "check_in": {"time": "14:00"}
            }
        }"#,
    )
    .unwrap()
}
