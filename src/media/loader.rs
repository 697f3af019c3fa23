//! Byte transport for media probes.
//!
//! The [`MediaLoader`] trait is the seam between the resolver and the
//! network: production uses [`HttpLoader`], tests inject in-memory loaders
//! so probe behavior is deterministic without a network.

use async_trait::async_trait;
use thiserror::Error;

/// Why a single asset could not be loaded. Never fatal to an export.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaProbeFailure {
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("{url} is not a decodable image: {reason}")]
    Decode { url: String, reason: String },
    #[error("{url} did not load within {timeout_ms} ms")]
    TimedOut { url: String, timeout_ms: u64 },
}

/// Fetches the raw bytes behind a media URL.
#[async_trait]
pub trait MediaLoader: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, MediaProbeFailure>;
}

/// `reqwest`-backed loader for absolute http(s) URLs.
pub struct HttpLoader {
    client: reqwest::Client,
}

impl HttpLoader {
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl MediaLoader for HttpLoader {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, MediaProbeFailure> {
        let request_failed = |e: reqwest::Error| MediaProbeFailure::Request {
            url: url.to_string(),
            reason: e.to_string(),
        };
        let response = self.client.get(url).send().await.map_err(request_failed)?;
        let status = response.status();
        if !status.is_success() {
            return Err(MediaProbeFailure::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(request_failed)?;
        Ok(bytes.to_vec())
    }
}
