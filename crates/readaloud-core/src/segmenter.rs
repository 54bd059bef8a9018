//! Chapter text splitting for read-aloud playback.
//!
//! A chapter body arrives either as plain text with line breaks or as the
//! light HTML the content API emits (`<p>` blocks, `<br>` breaks). Each
//! paragraph becomes one utterance; document order is speech order.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use unicode_normalization::UnicodeNormalization;

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\r?\n|<br\s*/?>|</?p(?:\s[^>]*)?>").expect("valid paragraph break regex")
});
static INLINE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid inline tag regex"));

/// What a chapter carries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum ContentKind {
    #[default]
    Narrative,
    /// Paginated image chapters (manga); nothing to speak.
    ImageSequence,
}

/// Split raw chapter content into speakable units.
pub fn segment(raw: &str, kind: ContentKind) -> Vec<String> {
    if kind == ContentKind::ImageSequence {
        return Vec::new();
    }

    PARAGRAPH_BREAK
        .split(raw)
        .map(clean_unit)
        .filter(|unit| !unit.is_empty())
        .collect()
}

fn clean_unit(unit: &str) -> String {
    let stripped = INLINE_TAG.replace_all(unit, "");
    let decoded = decode_entities(&stripped);
    decoded.trim().nfc().collect()
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    // `&amp;` last so an escaped entity is not decoded twice.
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
