//! crates/course_wizard_core/src/video.rs
//!
//! Recognizes the usual watch, short-link and embed URL shapes of the video host
//! and extracts the 11-character video identifier from them.

use regex::Regex;
use std::sync::LazyLock;

/// Length of every valid video identifier.
pub const VIDEO_ID_LEN: usize = 11;

static VIDEO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtu\.be/|v/|u/\w/|embed/|shorts/|watch\?v=|&v=)([^#&?/]*)")
        .expect("video URL pattern is valid")
});

/// Returns the video identifier embedded in `url`, or `None` when the URL does not
/// match a recognized shape or the identifier is malformed.
pub fn extract_video_id(url: &str) -> Option<String> {
    let captures = VIDEO_URL.captures(url.trim())?;
    let id = captures.get(1)?.as_str();
    let well_formed = id.len() == VIDEO_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    well_formed.then(|| id.to_string())
}
