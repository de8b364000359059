use serde::Serialize;
use thiserror::Error;

pub mod aggregate;
pub mod config_file;

pub use aggregate::ReferenceAggregator;

/// A single paragraph as produced by a document decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    /// Page header or footer content. Dropped before any text processing.
    pub is_header_or_footer: bool,
}

impl Paragraph {
    /// A body paragraph.
    pub fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_header_or_footer: false,
        }
    }

    /// A page header/footer paragraph.
    pub fn header_or_footer(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_header_or_footer: true,
        }
    }
}

/// A decoded document: paragraphs in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
}

impl Document {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self { paragraphs }
    }

    /// Build a document from plain text, one paragraph per blank-line-separated block.
    pub fn from_plain_text(text: &str) -> Self {
        let mut paragraphs = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    paragraphs.push(Paragraph::body(current.join("\n")));
                    current.clear();
                }
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            paragraphs.push(Paragraph::body(current.join("\n")));
        }

        Self { paragraphs }
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

/// A sentence span within a document's cleaned text.
///
/// Offsets are byte offsets into the cleaned text and always fall on `char`
/// boundaries, so `&text[start_offset..end_offset] == self.text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub index: usize,
    pub start_offset: usize,
    pub end_offset: usize,
    pub text: String,
}

/// A sentence that contains the keyword at least once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeywordMatch {
    pub sentence_index: usize,
}

/// The sentences around a keyword match, as one contiguous slice of cleaned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProximityWindow {
    /// Index of the sentence that contained the keyword.
    pub center: usize,
    /// First sentence index included (inclusive).
    pub first: usize,
    /// Last sentence index included (inclusive).
    pub last: usize,
    pub text: String,
}

/// A citation found inside a proximity window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CitationCandidate {
    /// Exact matched substring, used for display.
    pub raw_text: String,
    /// Canonical form, used only for deduplication.
    pub normalized_key: String,
}

/// Deduplicated citations in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReferenceList {
    entries: Vec<String>,
}

impl ReferenceList {
    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.entries.iter()
    }

    pub fn contains(&self, raw_text: &str) -> bool {
        self.entries.iter().any(|e| e == raw_text)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a ReferenceList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("unsupported file type: {0}")]
    Unsupported(String),
    #[error("corrupt document: {0}")]
    Corrupt(String),
    #[error("unsupported text encoding: {0}")]
    Encoding(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for document decoding backends.
///
/// Implementors turn raw file bytes into paragraphs; the extraction pipeline
/// (normalization, segmentation, keyword and citation matching) lives in
/// `citescan-parsing`.
pub trait DocumentDecoder: Send + Sync {
    /// Short human-readable format name, used in logs.
    fn format_name(&self) -> &'static str;

    /// Decode raw file content into a [`Document`].
    fn decode(&self, data: &[u8]) -> Result<Document, DecodeError>;
}

/// Why a file contributed nothing to the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum SkipReason {
    /// The decoder rejected the file.
    Decode(String),
    /// Nothing was left after removing headers, footers and the references section.
    EmptyDocument,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Decode(msg) => write!(f, "{msg}"),
            SkipReason::EmptyDocument => {
                write!(f, "no usable text after removing headers, footers and references")
            }
        }
    }
}

/// Per-file outcome of an extraction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Processed {
        sentences: usize,
        keyword_sentences: usize,
        candidates: usize,
    },
    Skipped {
        reason: SkipReason,
    },
}

/// Accounting for one attempted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub name: String,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, FileOutcome::Skipped { .. })
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match &self.outcome {
            FileOutcome::Skipped { reason } => Some(reason),
            FileOutcome::Processed { .. } => None,
        }
    }
}

/// Result of extracting citations from a set of files.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionReport {
    pub references: ReferenceList,
    /// One entry per attempted file, in input order.
    pub files: Vec<FileReport>,
}

impl ExtractionReport {
    pub fn processed_count(&self) -> usize {
        self.files.iter().filter(|f| !f.is_skipped()).count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.is_skipped())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_paragraphs_split_on_blank_lines() {
        let doc = Document::from_plain_text("First line\nwrapped.\n\n  \nSecond.\n");
        assert_eq!(doc.paragraphs.len(), 2);
        assert_eq!(doc.paragraphs[0].text, "First line\nwrapped.");
        assert_eq!(doc.paragraphs[1].text, "Second.");
        assert!(doc.paragraphs.iter().all(|p| !p.is_header_or_footer));
    }

    #[test]
    fn test_plain_text_empty() {
        assert!(Document::from_plain_text("\n\n   \n").is_empty());
    }

    #[test]
    fn test_report_serializes_skip_reason() {
        let report = FileReport {
            name: "broken.docx".into(),
            outcome: FileOutcome::Skipped {
                reason: SkipReason::Decode("corrupt document: bad zip".into()),
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["name"], "broken.docx");
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"]["kind"], "decode");
        assert_eq!(json["reason"]["message"], "corrupt document: bad zip");
    }

    #[test]
    fn test_reference_list_serializes_as_array() {
        let mut agg = ReferenceAggregator::new();
        agg.push(CitationCandidate {
            raw_text: "Smith, 2005".into(),
            normalized_key: "smith, 2005".into(),
        });
        let json = serde_json::to_string(&agg.finish()).unwrap();
        assert_eq!(json, r#"["Smith, 2005"]"#);
    }
}
