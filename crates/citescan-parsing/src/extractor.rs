use std::collections::HashSet;

use rayon::prelude::*;

use citescan_core::{CitationCandidate, Document, KeywordMatch, ProximityWindow, Sentence};

use crate::config::ParsingConfig;
use crate::grammar::{DEFAULT_NON_AUTHOR_WORDS, GrammarSet};
use crate::keyword::{self, Keyword};
use crate::sentence::{self, DEFAULT_ABBREVIATIONS};
use crate::{ParsingError, section};

/// What the pipeline found in one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentCitations {
    /// Sentences in the normalized text.
    pub sentence_count: usize,
    /// Sentences containing the keyword.
    pub keyword_matches: Vec<KeywordMatch>,
    /// Citations from every proximity window, in window order and left to
    /// right within a window. May repeat.
    pub candidates: Vec<CitationCandidate>,
}

/// A configurable keyword-proximate citation extraction pipeline.
///
/// Holds a [`ParsingConfig`] and exposes each pipeline step as a method.
/// The default constructor uses built-in defaults; use
/// [`CitationExtractor::with_config`] to supply a custom heading pattern,
/// window radius or word lists.
#[derive(Debug)]
pub struct CitationExtractor {
    config: ParsingConfig,
    abbreviations: HashSet<String>,
    grammars: GrammarSet,
}

impl Default for CitationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl CitationExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self::with_config(ParsingConfig::default())
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: ParsingConfig) -> Self {
        let abbreviations = config
            .abbreviations
            .resolve(&to_strings(DEFAULT_ABBREVIATIONS))
            .into_iter()
            .map(|a| a.trim_end_matches('.').to_lowercase())
            .collect();
        let non_author_words = config
            .non_author_words
            .resolve(&to_strings(DEFAULT_NON_AUTHOR_WORDS));
        let grammars = GrammarSet::standard_with_non_author_words(&non_author_words);
        Self {
            config,
            abbreviations,
            grammars,
        }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    /// The grammars used by [`match_citations`](Self::match_citations).
    pub fn grammars(&self) -> &GrammarSet {
        &self.grammars
    }

    /// Validate a keyword, honoring the configured whole-word setting.
    pub fn keyword(&self, raw: &str) -> Result<Keyword, ParsingError> {
        if self.config.whole_word {
            Keyword::whole_word(raw)
        } else {
            Keyword::new(raw)
        }
    }

    /// Flatten a decoded document into cleaned text (step 1).
    pub fn normalize(&self, doc: &Document) -> Result<String, ParsingError> {
        section::normalize_document_with_config(doc, &self.config)
    }

    /// Split cleaned text into sentences (step 2).
    pub fn segment_sentences(&self, text: &str) -> Vec<Sentence> {
        sentence::segment_sentences_with(text, &self.abbreviations)
    }

    /// Find the sentences containing the keyword (step 3).
    pub fn locate_keyword(&self, sentences: &[Sentence], keyword: &Keyword) -> Vec<KeywordMatch> {
        keyword::locate_keyword(sentences, keyword)
    }

    /// Build a proximity window around each keyword sentence (step 4).
    pub fn proximity_windows(
        &self,
        text: &str,
        sentences: &[Sentence],
        matches: &[KeywordMatch],
    ) -> Vec<ProximityWindow> {
        keyword::proximity_windows(text, sentences, matches, self.config.window_radius)
    }

    /// Find the citations in one window's text (step 5).
    pub fn match_citations(&self, text: &str) -> Vec<CitationCandidate> {
        self.grammars.match_citations(text)
    }

    /// Run steps 1 through 5 on one document.
    pub fn extract_document(
        &self,
        doc: &Document,
        keyword: &Keyword,
    ) -> Result<DocumentCitations, ParsingError> {
        let text = self.normalize(doc)?;
        let sentences = self.segment_sentences(&text);
        let keyword_matches = self.locate_keyword(&sentences, keyword);
        let windows = self.proximity_windows(&text, &sentences, &keyword_matches);

        let candidates: Vec<CitationCandidate> = windows
            .iter()
            .flat_map(|w| self.match_citations(&w.text))
            .collect();

        tracing::debug!(
            sentences = sentences.len(),
            keyword_sentences = keyword_matches.len(),
            candidates = candidates.len(),
            keyword = keyword.as_str(),
            "document processed"
        );

        Ok(DocumentCitations {
            sentence_count: sentences.len(),
            keyword_matches,
            candidates,
        })
    }

    /// Process documents in parallel. Results come back in input order.
    pub fn extract_documents(
        &self,
        docs: &[Document],
        keyword: &Keyword,
    ) -> Vec<Result<DocumentCitations, ParsingError>> {
        docs.par_iter()
            .map(|doc| self.extract_document(doc, keyword))
            .collect()
    }
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}
