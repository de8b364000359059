use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static YEAR_LIKE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[0-9]{4}[a-z]?\b").unwrap());

/// Expand common typographic ligatures.
pub fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}

/// Clean one paragraph's text.
///
/// NFC-normalizes, expands ligatures, drops zero-width characters, and
/// collapses every whitespace run (line breaks and non-breaking spaces
/// included) to a single ASCII space. The result is trimmed.
pub fn clean_paragraph(text: &str) -> String {
    let composed: String = expand_ligatures(text).nfc().collect();

    let mut out = String::with_capacity(composed.len());
    let mut pending_space = false;
    for c in composed.chars() {
        if matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' | '\u{00AD}') {
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }
    out
}

/// True for short paragraphs written entirely in capitals ("INTRODUCTION",
/// running titles). Needs at least one cased letter. A paragraph ending in
/// `.`, `!` or `?`, or containing a year, is prose set in capitals and not a
/// heading.
pub fn is_uppercase_heading(text: &str, max_chars: usize) -> bool {
    if text.chars().count() >= max_chars {
        return false;
    }
    if text.trim_end().ends_with(['.', '!', '?']) || YEAR_LIKE_RE.is_match(text) {
        return false;
    }
    let mut has_upper = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_upper = true;
        }
    }
    has_upper
}
