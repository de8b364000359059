//! Author-year citation grammars.
//!
//! Each grammar finds citations in a piece of text on its own. A
//! [`GrammarSet`] runs its grammars in priority order and drops any match that
//! overlaps a span already claimed by an earlier grammar, so a citation is
//! captured once, by the most specific grammar that recognizes it.

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use citescan_core::CitationCandidate;

/// A surname: an uppercase letter followed by letters, apostrophes or hyphens,
/// optionally behind nobiliary particles ("van Dijk", "De Souza").
const NAME: &str = r"(?:(?:[Vv]an|[Dd]e|[Dd]er|[Vv]on|[Dd]a|[Dd]i|[Ll]e)\s+)*\p{Lu}[\p{L}\p{M}'\u{2019}\-]+";
/// Four-digit year with an optional disambiguating letter ("2010a").
const YEAR: &str = r"[0-9]{4}[a-z]?\b";
const ET_AL: &str = r"(?i:et\s+al)\.?";

static ET_AL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\({NAME}\s+{ET_AL}(?:\s*,\s*|\s+){YEAR}\)|\b{NAME}\s+{ET_AL}(?:\s*\({YEAR}\)|(?:\s*,\s*|\s+){YEAR})"
    ))
    .unwrap()
});

static AMPERSAND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(?P<first>{NAME})\s+&\s+{NAME}(?:\s*\({YEAR}\)|(?:\s*,\s*|\s+){YEAR})"
    ))
    .unwrap()
});

static AND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(?P<first>{NAME})\s+and\s+{NAME}(?:\s*\({YEAR}\)|\s*,\s*{YEAR})"
    ))
    .unwrap()
});

static SINGLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(?P<first>{NAME})(?:\s*,\s*{YEAR}|\s+\({YEAR}\))"
    ))
    .unwrap()
});

/// Author part and trailing year of a citation, whatever separates them
/// (`, 2010`, ` 2010`, ` (2010)`).
static KEY_YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<authors>.+?)[\s,]*\(?\s*(?P<year>[0-9]{4}[a-z]?)\s*\)?$").unwrap()
});

static KEY_ET_AL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bet\s+al\b\.?").unwrap());

/// A parenthesized run containing at least one semicolon and no nested parentheses.
static GROUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^()]*;[^()]*)\)").unwrap());

/// Capitalized words that start sentences or name things other than authors.
/// Compared lowercase against the first surname of the two-author and
/// single-author grammars.
pub(crate) const DEFAULT_NON_AUTHOR_WORDS: &[&str] = &[
    // sentence adverbs and connectives
    "however", "moreover", "furthermore", "therefore", "thus", "hence", "also",
    "additionally", "finally", "similarly", "likewise", "indeed", "notably",
    "consequently", "meanwhile", "nevertheless", "nonetheless", "instead",
    "otherwise", "accordingly", "specifically", "overall", "importantly",
    "interestingly", "first", "second", "third", "then", "yet", "still",
    "recently", "previously", "currently", "later", "earlier", "today",
    "traditionally", "historically", "initially", "subsequently",
    // prepositions, determiners, pronouns at sentence start
    "in", "on", "at", "by", "for", "from", "since", "until", "during", "before",
    "after", "between", "as", "of", "to", "the", "this", "that", "these",
    "those", "it", "we", "our", "they", "their", "there", "here",
    // months ("May" is left out: it is also a surname)
    "january", "february", "march", "april", "june", "july", "august",
    "september", "october", "november", "december",
    // document furniture
    "table", "figure", "fig", "section", "chapter", "appendix", "volume", "vol",
    "equation", "eq", "results", "methods",
];

/// One match produced by a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarMatch {
    /// Byte range claimed in the searched text. Later grammars may not
    /// produce matches overlapping it.
    pub claimed: Range<usize>,
    /// Byte ranges of the individual citations, each inside `claimed`.
    pub citations: Vec<Range<usize>>,
}

impl GrammarMatch {
    fn single(range: Range<usize>) -> Self {
        Self {
            claimed: range.clone(),
            citations: vec![range],
        }
    }
}

/// A recognized citation syntax.
pub trait CitationGrammar: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// All non-overlapping matches in `text`, left to right.
    fn find_matches(&self, text: &str) -> Vec<GrammarMatch>;
}

/// A grammar backed by a single regex, optionally rejecting matches whose
/// first surname is a known non-author word.
#[derive(Debug, Clone)]
pub struct PatternGrammar {
    name: &'static str,
    regex: Regex,
    non_author_words: Option<HashSet<String>>,
}

impl PatternGrammar {
    /// `Smith et al., 2010`, `Smith et al. 2010a`, `(Smith et al., 2010)`,
    /// `Smith et al. (2010)`.
    pub fn et_al() -> Self {
        Self {
            name: "et-al",
            regex: ET_AL_RE.clone(),
            non_author_words: None,
        }
    }

    /// `Smith & Jones, 2008`, `Smith & Jones (2008)`.
    pub fn ampersand(non_author_words: HashSet<String>) -> Self {
        Self {
            name: "ampersand",
            regex: AMPERSAND_RE.clone(),
            non_author_words: Some(non_author_words),
        }
    }

    /// `Smith and Jones (2008)`, `Smith and Jones, 2008`.
    pub fn and(non_author_words: HashSet<String>) -> Self {
        Self {
            name: "and",
            regex: AND_RE.clone(),
            non_author_words: Some(non_author_words),
        }
    }

    /// `Smith, 2005`, `Smith (2005)`.
    pub fn single_author(non_author_words: HashSet<String>) -> Self {
        Self {
            name: "single-author",
            regex: SINGLE_RE.clone(),
            non_author_words: Some(non_author_words),
        }
    }

    fn is_rejected(&self, caps: &regex::Captures<'_>) -> bool {
        let (Some(words), Some(first)) = (&self.non_author_words, caps.name("first")) else {
            return false;
        };
        words.contains(&first.as_str().to_lowercase())
    }
}

impl CitationGrammar for PatternGrammar {
    fn name(&self) -> &'static str {
        self.name
    }

    fn find_matches(&self, text: &str) -> Vec<GrammarMatch> {
        self.regex
            .captures_iter(text)
            .filter(|caps| !self.is_rejected(caps))
            .filter_map(|caps| caps.get(0).map(|m| GrammarMatch::single(m.range())))
            .collect()
    }
}

/// `(Smith, 2005; Jones et al., 2012)`: every semicolon-separated segment is
/// re-parsed with the inner grammars and reported as its own citation. The
/// group only matches when at least two segments contain a citation.
#[derive(Debug)]
pub struct GroupedGrammar {
    inner: GrammarSet,
}

impl GroupedGrammar {
    pub fn new(inner: GrammarSet) -> Self {
        Self { inner }
    }
}

impl CitationGrammar for GroupedGrammar {
    fn name(&self) -> &'static str {
        "grouped"
    }

    fn find_matches(&self, text: &str) -> Vec<GrammarMatch> {
        let mut matches = Vec::new();

        for caps in GROUP_RE.captures_iter(text) {
            let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            let mut citations = Vec::new();
            let mut cited_segments = 0;
            let mut offset = body.start();
            for segment in body.as_str().split(';') {
                let spans = self.inner.find_citation_spans(segment);
                if !spans.is_empty() {
                    cited_segments += 1;
                }
                citations.extend(spans.into_iter().map(|r| r.start + offset..r.end + offset));
                offset += segment.len() + 1;
            }

            if cited_segments >= 2 {
                matches.push(GrammarMatch {
                    claimed: whole.range(),
                    citations,
                });
            }
        }

        matches
    }
}

/// Grammars in priority order.
#[derive(Debug, Default)]
pub struct GrammarSet {
    grammars: Vec<Box<dyn CitationGrammar>>,
}

impl GrammarSet {
    pub fn new(grammars: Vec<Box<dyn CitationGrammar>>) -> Self {
        Self { grammars }
    }

    /// The built-in grammars with the default non-author word list.
    pub fn standard() -> Self {
        let words: Vec<String> = DEFAULT_NON_AUTHOR_WORDS
            .iter()
            .map(|w| w.to_string())
            .collect();
        Self::standard_with_non_author_words(&words)
    }

    /// The built-in grammars, in priority order: grouped parenthetical,
    /// et al., ampersand, "and", single author.
    pub fn standard_with_non_author_words(words: &[String]) -> Self {
        let mut grammars: Vec<Box<dyn CitationGrammar>> = vec![Box::new(GroupedGrammar::new(
            Self::individual(words),
        ))];
        grammars.extend(Self::individual(words).grammars);
        Self { grammars }
    }

    /// Grammars that each recognize exactly one citation per match.
    fn individual(words: &[String]) -> Self {
        let set: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
        Self::new(vec![
            Box::new(PatternGrammar::et_al()),
            Box::new(PatternGrammar::ampersand(set.clone())),
            Box::new(PatternGrammar::and(set.clone())),
            Box::new(PatternGrammar::single_author(set)),
        ])
    }

    /// Append a grammar with the lowest priority.
    pub fn push(&mut self, grammar: Box<dyn CitationGrammar>) {
        self.grammars.push(grammar);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.grammars.iter().map(|g| g.name()).collect()
    }

    /// Citation byte ranges in `text`, ordered by start position.
    pub fn find_citation_spans(&self, text: &str) -> Vec<Range<usize>> {
        let mut claimed: Vec<Range<usize>> = Vec::new();
        let mut spans = Vec::new();

        for grammar in &self.grammars {
            for m in grammar.find_matches(text) {
                if claimed.iter().any(|c| overlaps(c, &m.claimed)) {
                    tracing::trace!(
                        grammar = grammar.name(),
                        text = &text[m.claimed.clone()],
                        "match overlaps a higher-priority citation"
                    );
                    continue;
                }
                claimed.push(m.claimed);
                spans.extend(m.citations);
            }
        }

        spans.sort_by_key(|r| r.start);
        spans
    }

    /// Citations in `text`, left to right.
    pub fn match_citations(&self, text: &str) -> Vec<CitationCandidate> {
        self.find_citation_spans(text)
            .into_iter()
            .map(|range| {
                let raw = &text[range];
                CitationCandidate {
                    raw_text: raw.to_string(),
                    normalized_key: normalize_key(raw),
                }
            })
            .collect()
    }
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

static STANDARD: Lazy<GrammarSet> = Lazy::new(GrammarSet::standard);

/// Find citations in `text` with the built-in grammars.
pub fn extract_citations_from_text(text: &str) -> Vec<CitationCandidate> {
    STANDARD.match_citations(text)
}

/// Canonical deduplication key for a citation.
///
/// Strips trailing `.,;:` and parentheses enclosing the whole citation,
/// collapses whitespace, folds typographic apostrophes and lowercases. The
/// author part and the year are then rewritten as `authors, year`, with
/// `et al` always spelled `et al.`, so `Smith et al. (2010)`,
/// `(Smith et al., 2010)` and `Smith et al 2010` share one key.
pub fn normalize_key(raw: &str) -> String {
    const TRAILING: [char; 4] = ['.', ',', ';', ':'];

    let mut s = raw.trim().trim_end_matches(TRAILING).trim_end();
    if is_enclosed_in_parens(s) {
        s = s[1..s.len() - 1].trim().trim_end_matches(TRAILING).trim_end();
    }

    let folded = s
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\u{2019}', "'")
        .to_lowercase();

    let Some(caps) = KEY_YEAR_RE.captures(&folded) else {
        return folded;
    };
    let (Some(authors), Some(year)) = (caps.name("authors"), caps.name("year")) else {
        return folded;
    };
    let authors = authors.as_str().trim_end_matches([',', ' ']);
    let authors = KEY_ET_AL_RE.replace_all(authors, "et al.");
    format!("{authors}, {}", year.as_str())
}

/// True if the opening parenthesis at the start is closed by the one at the end.
fn is_enclosed_in_parens(s: &str) -> bool {
    if !(s.starts_with('(') && s.ends_with(')')) || s.len() < 2 {
        return false;
    }
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 && i != s.len() - 1 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}
