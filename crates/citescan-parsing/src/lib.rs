use thiserror::Error;

pub mod config;
pub mod extractor;
pub mod grammar;
pub mod keyword;
pub mod section;
pub mod sentence;
pub mod text_processing;

pub use config::{ListOverride, ParsingConfig, ParsingConfigBuilder};
pub use extractor::{CitationExtractor, DocumentCitations};
pub use grammar::{CitationGrammar, GrammarMatch, GrammarSet, normalize_key};
pub use keyword::Keyword;
// Re-export domain types from core (canonical definitions live there)
pub use citescan_core::{
    CitationCandidate, Document, KeywordMatch, Paragraph, ProximityWindow, ReferenceAggregator,
    ReferenceList, Sentence,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("document has no text after normalization")]
    EmptyDocument,
    #[error("keyword is empty")]
    EmptyKeyword,
    #[error("invalid keyword: {0}")]
    InvalidKeyword(String),
}

/// Extract the deduplicated, first-seen-ordered citations near `keyword`
/// across `documents`.
///
/// Pipeline:
/// 1. Validate the keyword (fails before any document is touched)
/// 2. Normalize each document, dropping headers, footers and the references section
/// 3. Segment sentences and find the ones mentioning the keyword
/// 4. Match citation grammars inside each keyword's proximity window
/// 5. Merge candidates in document order, keeping the first spelling of each key
///
/// Documents that normalize to nothing are skipped. An empty result is not
/// an error.
pub fn extract_citations(
    documents: &[Document],
    keyword: &str,
) -> Result<ReferenceList, ParsingError> {
    let extractor = CitationExtractor::new();
    let keyword = extractor.keyword(keyword)?;

    let mut aggregator = ReferenceAggregator::new();
    for (i, result) in extractor
        .extract_documents(documents, &keyword)
        .into_iter()
        .enumerate()
    {
        match result {
            Ok(found) => {
                aggregator.extend(found.candidates);
            }
            Err(e) => tracing::warn!(document = i, error = %e, "skipping document"),
        }
    }

    Ok(aggregator.finish())
}
