//! Plain-text sanitizer for user-submitted content.

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid script regex")
});

static STYLE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("valid style regex")
});

static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));

/// Strip markup from `raw`.
///
/// `<script>` and `<style>` elements are removed together with their
/// contents; every other tag is removed but its text is kept. An unclosed
/// `<script` swallows the rest of the input.
#[must_use]
pub fn sanitize_text(raw: &str) -> String {
    let without_blocks = SCRIPT_BLOCK.replace_all(raw, "");
    let without_blocks = STYLE_BLOCK.replace_all(&without_blocks, "");

    let lowered = without_blocks.to_ascii_lowercase();
    let cut = lowered.find("<script").map_or(without_blocks.len(), |i| i);

    ANY_TAG
        .replace_all(&without_blocks[..cut], "")
        .trim()
        .to_string()
}

/// Truncate to at most `max` characters, never splitting a code point.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
