use once_cell::sync::Lazy;
use regex::Regex;

use citescan_core::Document;

use crate::ParsingError;
use crate::config::ParsingConfig;
use crate::text_processing::{clean_paragraph, is_uppercase_heading};

/// Separator placed between kept paragraphs. The sentence segmenter always
/// breaks here.
pub const PARAGRAPH_BREAK: &str = "\n\n";

/// Built-in references heading: a whole line reading "References",
/// "Bibliography", "Works Cited", "Literature Cited" or "Sources", in any case,
/// singular or plural, with an optional section number ("7.", "VII") and an
/// optional trailing colon.
static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?:\d+(?:\.\d+)*|(?-i:[IVXLC]+))\.?\s+)?(?:references?|bibliograph(?:y|ies)|works?\s+cited|literature\s+cited|sources?)\s*[:.]?\s*$",
    )
    .unwrap()
});

/// True if `line` is a references-section heading under the built-in pattern.
pub fn is_references_heading(line: &str) -> bool {
    HEADER_RE.is_match(line)
}

/// Turn a decoded document into cleaned text.
///
/// Header/footer paragraphs are dropped, everything from the references
/// heading onward is cut, and the remaining paragraphs are cleaned and joined
/// with [`PARAGRAPH_BREAK`]. Fails with [`ParsingError::EmptyDocument`] when
/// nothing is left.
pub fn normalize_document(doc: &Document) -> Result<String, ParsingError> {
    normalize_document_with_config(doc, &ParsingConfig::default())
}

/// Config-aware version of [`normalize_document`].
///
/// A custom `section_header_re` is matched against single lines, so it should
/// be anchored with `^`/`$`.
pub(crate) fn normalize_document_with_config(
    doc: &Document,
    config: &ParsingConfig,
) -> Result<String, ParsingError> {
    let header_re = config.section_header_re.as_ref().unwrap_or(&HEADER_RE);

    let mut kept: Vec<String> = Vec::new();
    let mut dropped_headers = 0usize;

    for (i, para) in doc.paragraphs.iter().enumerate() {
        if para.is_header_or_footer {
            dropped_headers += 1;
            continue;
        }

        // Scan line by line: plain-text paragraphs often carry the heading and
        // the first entries in one block ("References\nSmith, J. (2010) ...").
        let mut body_lines = Vec::new();
        let mut reached_references = false;
        for line in para.text.lines() {
            if header_re.is_match(line) {
                reached_references = true;
                break;
            }
            body_lines.push(line);
        }

        let cleaned = clean_paragraph(&body_lines.join("\n"));
        let is_heading = config.skip_uppercase_headings
            && is_uppercase_heading(&cleaned, config.uppercase_heading_max_chars);
        if !cleaned.is_empty() && !is_heading {
            kept.push(cleaned);
        }

        if reached_references {
            tracing::debug!(
                paragraph = i,
                remaining = doc.paragraphs.len() - i - 1,
                "references section reached, dropping the rest"
            );
            break;
        }
    }

    tracing::trace!(kept = kept.len(), dropped_headers, "document normalized");

    if kept.is_empty() {
        return Err(ParsingError::EmptyDocument);
    }
    Ok(kept.join(PARAGRAPH_BREAK))
}
