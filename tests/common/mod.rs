//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use guidebook_print::media::{MediaLoader, MediaProbeFailure};
use guidebook_print::model::ContentModel;
use image::{ImageFormat, Rgb, RgbImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;
use std::time::Duration;

/// Serves registered URLs from memory; anything else is unreachable.
#[derive(Default)]
pub struct FixtureLoader {
    images: HashMap<String, Vec<u8>>,
    delay: Option<Duration>,
    calls: Mutex<usize>,
}

impl FixtureLoader {
    pub fn with_image(mut self, url: &str, color: [u8; 3]) -> Self {
        self.images.insert(url.to_string(), png_bytes(64, 48, color));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl MediaLoader for FixtureLoader {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, MediaProbeFailure> {
        *self.calls.lock().unwrap() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| MediaProbeFailure::Request {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            })
    }
}

pub fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb(color));
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

pub const VILLA_AZUR_PHOTO: &str = "https://media.example/villa-azur/front.jpg";

/// One photo, check-in at 14:00, no address, no link, no coordinates.
pub fn villa_azur() -> ContentModel {
    serde_json::from_str(
        r#"{
            "property": {
                "name": "Villa Azur",
                "front_photo_url": "https://media.example/villa-azur/front.jpg",
                "check_in": {"time": "14:00"}
            }
        }"#,
    )
    .unwrap()
}
