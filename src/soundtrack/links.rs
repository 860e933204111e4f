//! Catalog ids embedded in public album and track URLs.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{PipelineError, PipelineResult};

fn album_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"album/([a-zA-Z0-9]+)").expect("valid album link pattern"))
}

fn track_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"track/([a-zA-Z0-9]+)").expect("valid track link pattern"))
}

fn capture(pattern: &Regex, link: &str, what: &'static str) -> PipelineResult<String> {
    pattern
        .captures(link)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| PipelineError::malformed(what, link))
}

/// `https://open.spotify.com/album/<id>` → `<id>`.
pub fn album_id(link: &str) -> PipelineResult<String> {
    capture(album_pattern(), link, "album link")
}

/// `https://open.spotify.com/track/<id>` → `<id>`.
pub fn track_id(link: &str) -> PipelineResult<String> {
    capture(track_pattern(), link, "track link")
}
