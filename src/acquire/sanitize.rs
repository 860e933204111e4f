use regex::Regex;
use std::sync::OnceLock;

/// Directory name used when a developer or game name has no usable
/// characters.
pub const UNTITLED: &str = "untitled";

fn disallowed() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-zA-Z0-9\s]").expect("valid sanitize pattern"))
}

/// Drop every character outside ASCII letters, digits and whitespace.
///
/// The result is both the file stem of a track and the `song_name` it is
/// stored under, so it must stay stable across runs.
pub fn sanitize(text: &str) -> String {
    disallowed().replace_all(text, "").into_owned()
}

/// [`sanitize`] for a directory component: trimmed, never empty.
pub fn sanitize_component(text: &str) -> String {
    let cleaned = sanitize(text);
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    }
}
