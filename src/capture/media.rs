//! URL handling for captured media: resolution against the page, provider
//! embed URLs, `data:` decoding, and content naming.

#[cfg(test)]
#[path = "media_test.rs"]
mod media_test;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::DownloadError;

pub const SVG_MIME: &str = "image/svg+xml";
const FALLBACK_MIME: &str = "application/octet-stream";

/// How a `<video>` or `<iframe>` ends up in the note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaLink {
    /// Canonical player URL on a recognized provider.
    Embed(String),
    Link(String),
}

/// Resolve `raw` against the page URL. Absolute URLs pass through.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidUrl`] when neither `raw` nor the page URL
/// can be parsed.
pub fn resolve_url(raw: &str, base: &str) -> Result<Url, DownloadError> {
    let raw = raw.trim();
    if let Ok(url) = Url::parse(raw) {
        return Ok(url);
    }
    Url::parse(base)
        .and_then(|b| b.join(raw))
        .map_err(|e| DownloadError::InvalidUrl(format!("{raw}: {e}")))
}

/// URL of the first candidate in a `srcset` list.
#[must_use]
pub fn first_srcset_candidate(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .map(str::trim)
        .find(|c| !c.is_empty())
        .and_then(|c| c.split_whitespace().next())
}

/// Embed for a video or frame source shown on `page_url`.
///
/// Provider URLs become canonical embeds. A `blob:` source has no stable
/// address, so it embeds the provider page it plays on, or links to the page
/// otherwise.
#[must_use]
pub fn media_link(src: &str, page_url: &str) -> MediaLink {
    let src = src.trim();
    if src.starts_with("blob:") {
        return match Url::parse(page_url) {
            Ok(page) => match provider_embed(&page) {
                Some(embed) => MediaLink::Embed(embed),
                None => MediaLink::Link(page_url.to_string()),
            },
            Err(_) => MediaLink::Link(page_url.to_string()),
        };
    }
    match resolve_url(src, page_url) {
        Ok(url) => match provider_embed(&url) {
            Some(embed) => MediaLink::Embed(embed),
            None => MediaLink::Link(url.to_string()),
        },
        Err(_) => MediaLink::Link(src.to_string()),
    }
}

/// Canonical embed URL when `url` points at a YouTube or Vimeo video.
#[must_use]
pub fn provider_embed(url: &Url) -> Option<String> {
    if let Some(id) = youtube_id(url) {
        return Some(format!("https://www.youtube.com/embed/{id}"));
    }
    vimeo_id(url).map(|id| format!("https://player.vimeo.com/video/{id}"))
}

fn host(url: &Url) -> &str {
    url.host_str().map_or("", |h| h.strip_prefix("www.").unwrap_or(h))
}

fn youtube_id(url: &Url) -> Option<String> {
    let host = host(url);
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    let id = match host {
        "youtu.be" => segments.next()?.to_string(),
        "youtube.com" | "m.youtube.com" | "youtube-nocookie.com" | "music.youtube.com" => match segments.next()? {
            "watch" => url.query_pairs().find(|(k, _)| k == "v")?.1.into_owned(),
            "embed" | "shorts" | "v" | "live" => segments.next()?.to_string(),
            _ => return None,
        },
        _ => return None,
    };
    let valid = !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then_some(id)
}

fn vimeo_id(url: &Url) -> Option<String> {
    let host = host(url);
    if host != "vimeo.com" && host != "player.vimeo.com" {
        return None;
    }
    url.path_segments()?
        .find(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
}

/// Decode `data:[<mime>][;base64],<payload>`.
///
/// # Errors
///
/// Returns [`DownloadError::DataUrl`] for a missing comma or bad base64.
pub fn decode_data_url(raw: &str) -> Result<(Vec<u8>, String), DownloadError> {
    let rest = raw
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| DownloadError::DataUrl("missing data: scheme".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| DownloadError::DataUrl("missing payload separator".into()))?;
    let mut params = header.split(';');
    let mime = match params.next().map(str::trim) {
        Some(m) if !m.is_empty() => m.to_ascii_lowercase(),
        _ => "text/plain".to_string(),
    };
    let bytes = if params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD
            .decode(compact)
            .map_err(|e| DownloadError::DataUrl(e.to_string()))?
    } else {
        percent_decode(payload)
    };
    Ok((bytes, mime))
}

fn percent_decode(raw: &str) -> Vec<u8> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let hex = if bytes[i] == b'%' { raw.get(i + 1..i + 3) } else { None };
        let decoded = match hex.filter(|h| h.chars().all(|c| c.is_ascii_hexdigit())) {
            Some(h) => match u8::from_str_radix(h, 16) {
                Ok(b) => Some(b),
                Err(_) => None,
            },
            None => None,
        };
        match decoded {
            Some(b) => {
                out.push(b);
                i += 3;
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    out
}

/// Content type from the server, else guessed from the URL's extension.
#[must_use]
pub fn mime_for(url: &str, declared: Option<&str>) -> String {
    if let Some(mime) = declared.filter(|m| !m.is_empty()) {
        return mime.to_string();
    }
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let ext = path.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase()).unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => SVG_MIME,
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        _ => FALLBACK_MIME,
    }
    .to_string()
}

/// Storage name for `bytes`: lowercase hex sha256.
#[must_use]
pub fn content_name(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}
