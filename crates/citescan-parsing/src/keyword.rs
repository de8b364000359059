use regex::{Regex, RegexBuilder};

use citescan_core::{KeywordMatch, ProximityWindow, Sentence};

use crate::ParsingError;

/// A validated, case-insensitive search keyword or phrase.
///
/// Whitespace inside a phrase is matched literally; there is no stemming or
/// fuzzy matching.
#[derive(Debug, Clone)]
pub struct Keyword {
    raw: String,
    pattern: Regex,
    whole_word: bool,
}

impl Keyword {
    /// Substring keyword. Fails with [`ParsingError::EmptyKeyword`] if blank.
    pub fn new(raw: &str) -> Result<Self, ParsingError> {
        Self::build(raw, false)
    }

    /// Keyword that only matches when not flanked by letters or digits.
    pub fn whole_word(raw: &str) -> Result<Self, ParsingError> {
        Self::build(raw, true)
    }

    fn build(raw: &str, whole_word: bool) -> Result<Self, ParsingError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParsingError::EmptyKeyword);
        }
        let pattern = RegexBuilder::new(&regex::escape(trimmed))
            .case_insensitive(true)
            .build()
            .map_err(|e| ParsingError::InvalidKeyword(e.to_string()))?;
        Ok(Self {
            raw: trimmed.to_string(),
            pattern,
            whole_word,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True if `text` contains the keyword at least once.
    pub fn is_found_in(&self, text: &str) -> bool {
        if !self.whole_word {
            return self.pattern.is_match(text);
        }
        self.pattern.find_iter(text).any(|m| {
            let before = text[..m.start()].chars().next_back();
            let after = text[m.end()..].chars().next();
            before.is_none_or(|c| !c.is_alphanumeric()) && after.is_none_or(|c| !c.is_alphanumeric())
        })
    }
}

/// Indices of sentences containing the keyword, in sentence order, one entry
/// per sentence.
pub fn locate_keyword(sentences: &[Sentence], keyword: &Keyword) -> Vec<KeywordMatch> {
    sentences
        .iter()
        .filter(|s| keyword.is_found_in(&s.text))
        .map(|s| KeywordMatch {
            sentence_index: s.index,
        })
        .collect()
}

/// Build one window per match: the matched sentence plus `radius` sentences
/// on each side, clamped to the document. Window text is sliced from `text`
/// using the sentences' offsets, so whatever lies between them is kept.
pub fn proximity_windows(
    text: &str,
    sentences: &[Sentence],
    matches: &[KeywordMatch],
    radius: usize,
) -> Vec<ProximityWindow> {
    let Some(last_index) = sentences.len().checked_sub(1) else {
        return Vec::new();
    };

    matches
        .iter()
        .filter(|m| m.sentence_index <= last_index)
        .map(|m| {
            let first = m.sentence_index.saturating_sub(radius);
            let last = m.sentence_index.saturating_add(radius).min(last_index);
            let start = sentences[first].start_offset;
            let end = sentences[last].end_offset;
            ProximityWindow {
                center: m.sentence_index,
                first,
                last,
                text: text[start..end].to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentence::segment_sentences;

    #[test]
    fn test_empty_keyword_rejected() {
        assert!(matches!(Keyword::new(""), Err(ParsingError::EmptyKeyword)));
        assert!(matches!(Keyword::new("  \t\n"), Err(ParsingError::EmptyKeyword)));
        assert!(matches!(
            Keyword::whole_word(" "),
            Err(ParsingError::EmptyKeyword)
        ));
    }

    #[test]
    fn test_keyword_is_trimmed() {
        assert_eq!(Keyword::new("  claim ").unwrap().as_str(), "claim");
    }

    #[test]
    fn test_case_insensitive_substring() {
        let kw = Keyword::new("Finding").unwrap();
        assert!(kw.is_found_in("This FINDING confirms it."));
        assert!(kw.is_found_in("Our findings were robust."));
        assert!(!kw.is_found_in("Nothing here."));
    }

    #[test]
    fn test_phrase_whitespace_is_literal() {
        let kw = Keyword::new("claim about").unwrap();
        assert!(kw.is_found_in("this claim about X"));
        assert!(!kw.is_found_in("this claim  about X"));
        assert!(!kw.is_found_in("this claim, about X"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let kw = Keyword::new("C++ (v2)").unwrap();
        assert!(kw.is_found_in("Written in C++ (v2) mostly."));
        assert!(!kw.is_found_in("Written in Cpp v2."));
    }

    #[test]
    fn test_whole_word() {
        let kw = Keyword::whole_word("finding").unwrap();
        assert!(kw.is_found_in("This finding, again."));
        assert!(!kw.is_found_in("Our findings were robust."));
        assert!(kw.is_found_in("findings and a finding"));
    }

    #[test]
    fn test_one_match_per_sentence() {
        let sentences = segment_sentences("Claim one, claim two. Other. A claim.");
        let kw = Keyword::new("claim").unwrap();
        let found: Vec<usize> = locate_keyword(&sentences, &kw)
            .into_iter()
            .map(|m| m.sentence_index)
            .collect();
        assert_eq!(found, vec![0, 2]);
    }

    #[test]
    fn test_windows_clamp_to_bounds() {
        let text = "Zero. One. Two. Three.";
        let sentences = segment_sentences(text);
        assert_eq!(sentences.len(), 4);
        let matches = [
            KeywordMatch { sentence_index: 0 },
            KeywordMatch { sentence_index: 2 },
            KeywordMatch { sentence_index: 3 },
        ];
        let windows = proximity_windows(text, &sentences, &matches, 1);
        assert_eq!(windows[0].text, "Zero. One.");
        assert_eq!((windows[0].first, windows[0].last), (0, 1));
        assert_eq!(windows[1].text, "One. Two. Three.");
        assert_eq!(windows[2].text, "Two. Three.");
        assert_eq!(windows[2].center, 3);
    }

    #[test]
    fn test_window_radius_zero_and_wide() {
        let text = "Zero. One. Two. Three.";
        let sentences = segment_sentences(text);
        let m = [KeywordMatch { sentence_index: 1 }];
        assert_eq!(proximity_windows(text, &sentences, &m, 0)[0].text, "One.");
        assert_eq!(proximity_windows(text, &sentences, &m, 5)[0].text, text);
    }

    #[test]
    fn test_windows_without_sentences() {
        let m = [KeywordMatch { sentence_index: 0 }];
        assert!(proximity_windows("", &[], &m, 1).is_empty());
    }
}
