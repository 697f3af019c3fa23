//! Static thumbnail URLs for video references.
//!
//! A video cannot be painted into a raster, so every video reference is
//! replaced by a still image before capture:
//!
//! | Source | Thumbnail |
//! |---|---|
//! | YouTube (`watch?v=`, `youtu.be/`, `embed/`, `shorts/`, `live/`) | `https://img.youtube.com/vi/<id>/hqdefault.jpg` |
//! | Dailymotion (`/video/<id>`, `dai.ly/<id>`) | `https://www.dailymotion.com/thumbnail/video/<id>` |
//! | anything else | `<proxy>?url=<encoded>` (same-origin relay of the remote bytes) |
//!
//! URLs are parsed with `reqwest::Url`, so scheme and host case, trailing
//! dots on hosts, ports, and query parameter order do not matter.

use reqwest::Url;

/// The thumbnail to load in place of `video_url`.
pub fn thumbnail_url(video_url: &str, proxy_endpoint: &str) -> String {
    known_thumbnail(video_url).unwrap_or_else(|| proxy_url(proxy_endpoint, video_url))
}

/// Thumbnail URL for hosts with a public thumbnail convention.
pub fn known_thumbnail(video_url: &str) -> Option<String> {
    let url = Url::parse(video_url.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let mut segments = url.path_segments()?.filter(|segment| !segment.is_empty());
    match normalized_host(&url)? {
        "youtu.be" => segments
            .next()
            .filter(|id| is_video_id(id))
            .map(youtube_thumbnail),
        "youtube.com" | "youtube-nocookie.com" | "music.youtube.com" => {
            youtube_id(&url).as_deref().map(youtube_thumbnail)
        }
        "dai.ly" => segments
            .next()
            .filter(|id| is_video_id(id))
            .map(dailymotion_thumbnail),
        "dailymotion.com" => match (segments.next(), segments.next()) {
            (Some("video"), Some(slug)) => slug
                .split('_')
                .next()
                .filter(|id| is_video_id(id))
                .map(dailymotion_thumbnail),
            _ => None,
        },
        _ => None,
    }
}

/// Route `url` through the same-origin relay.
pub fn proxy_url(proxy_endpoint: &str, url: &str) -> String {
    let separator = if proxy_endpoint.contains('?') { '&' } else { '?' };
    format!("{proxy_endpoint}{separator}url={}", urlencoding::encode(url))
}

fn youtube_thumbnail(id: &str) -> String {
    format!("https://img.youtube.com/vi/{id}/hqdefault.jpg")
}

fn dailymotion_thumbnail(id: &str) -> String {
    format!("https://www.dailymotion.com/thumbnail/video/{id}")
}

/// Lowercase host without a trailing dot or a `www.` / `m.` prefix.
fn normalized_host(url: &Url) -> Option<&str> {
    let host = url.host_str()?.trim_end_matches('.');
    Some(
        host.strip_prefix("www.")
            .or_else(|| host.strip_prefix("m."))
            .unwrap_or(host),
    )
}

/// The video ID of a youtube.com URL (`watch?v=`, `embed/`, `shorts/`, ...).
fn youtube_id(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?.filter(|segment| !segment.is_empty());
    let id = match segments.next()? {
        "watch" => url
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned()),
        "embed" | "shorts" | "live" | "v" => segments.next().map(str::to_string),
        _ => None,
    };
    id.filter(|id| is_video_id(id))
}

fn is_video_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
