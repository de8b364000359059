use regex::Regex;

use citescan_core::config_file::ExtractionConfig;

/// Controls how a list of values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// Configuration for the citation extraction pipeline.
///
/// `section_header_re` is `None` for "use the built-in default".
/// Use [`ParsingConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    // ── section.rs ──
    /// Regex matching a references-section heading line.
    pub(crate) section_header_re: Option<Regex>,
    /// Drop short all-uppercase paragraphs (titles, running heads).
    pub(crate) skip_uppercase_headings: bool,
    /// Longest paragraph (in chars) still considered an uppercase heading.
    pub(crate) uppercase_heading_max_chars: usize,

    // ── sentence.rs ──
    /// Abbreviations whose trailing period never ends a sentence.
    pub(crate) abbreviations: ListOverride<String>,

    // ── keyword.rs ──
    /// Sentences scanned on each side of a keyword sentence.
    pub(crate) window_radius: usize,
    /// Match the keyword on word boundaries instead of as a bare substring.
    pub(crate) whole_word: bool,

    // ── grammar.rs ──
    /// Capitalized words never accepted as a single-author surname.
    pub(crate) non_author_words: ListOverride<String>,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            section_header_re: None,
            skip_uppercase_headings: true,
            uppercase_heading_max_chars: 100,
            abbreviations: ListOverride::Default,
            window_radius: 1,
            whole_word: false,
            non_author_words: ListOverride::Default,
        }
    }
}

impl ParsingConfig {
    pub fn window_radius(&self) -> usize {
        self.window_radius
    }

    pub fn whole_word(&self) -> bool {
        self.whole_word
    }
}

/// Builder for [`ParsingConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in [`build()`](Self::build).
/// Fails fast with `regex::Error` if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    section_header_re: Option<String>,
    skip_uppercase_headings: Option<bool>,
    uppercase_heading_max_chars: Option<usize>,
    abbreviations: ListOverride<String>,
    window_radius: Option<usize>,
    whole_word: Option<bool>,
    non_author_words: ListOverride<String>,
}

fn push_extend(list: &mut ListOverride<String>, value: String) {
    match list {
        ListOverride::Extend(v) | ListOverride::Replace(v) => v.push(value),
        ListOverride::Default => *list = ListOverride::Extend(vec![value]),
    }
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builder from the `[extraction]` section of a config file.
    /// List values extend the built-in defaults.
    pub fn from_file_config(file: &ExtractionConfig) -> Self {
        let mut builder = Self::new();
        builder.section_header_re = file.section_header_regex.clone();
        builder.skip_uppercase_headings = file.skip_uppercase_headings;
        builder.window_radius = file.window_radius;
        builder.whole_word = file.whole_word;
        if let Some(abbrevs) = &file.abbreviations {
            builder.abbreviations = ListOverride::Extend(abbrevs.clone());
        }
        if let Some(words) = &file.non_author_words {
            builder.non_author_words = ListOverride::Extend(words.clone());
        }
        builder
    }

    // ── Section handling ──

    pub fn section_header_regex(mut self, pattern: &str) -> Self {
        self.section_header_re = Some(pattern.to_string());
        self
    }

    pub fn skip_uppercase_headings(mut self, skip: bool) -> Self {
        self.skip_uppercase_headings = Some(skip);
        self
    }

    pub fn uppercase_heading_max_chars(mut self, n: usize) -> Self {
        self.uppercase_heading_max_chars = Some(n);
        self
    }

    // ── Abbreviations ──

    pub fn set_abbreviations(mut self, abbreviations: Vec<String>) -> Self {
        self.abbreviations = ListOverride::Replace(abbreviations);
        self
    }

    pub fn add_abbreviation(mut self, abbreviation: String) -> Self {
        push_extend(&mut self.abbreviations, abbreviation);
        self
    }

    // ── Keyword window ──

    pub fn window_radius(mut self, radius: usize) -> Self {
        self.window_radius = Some(radius);
        self
    }

    pub fn whole_word(mut self, whole_word: bool) -> Self {
        self.whole_word = Some(whole_word);
        self
    }

    // ── Non-author words ──

    pub fn set_non_author_words(mut self, words: Vec<String>) -> Self {
        self.non_author_words = ListOverride::Replace(words);
        self
    }

    pub fn add_non_author_word(mut self, word: String) -> Self {
        push_extend(&mut self.non_author_words, word);
        self
    }

    /// Compile all string patterns and produce a [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, regex::Error> {
        let defaults = ParsingConfig::default();
        Ok(ParsingConfig {
            section_header_re: self.section_header_re.map(|p| Regex::new(&p)).transpose()?,
            skip_uppercase_headings: self
                .skip_uppercase_headings
                .unwrap_or(defaults.skip_uppercase_headings),
            uppercase_heading_max_chars: self
                .uppercase_heading_max_chars
                .unwrap_or(defaults.uppercase_heading_max_chars),
            abbreviations: self.abbreviations,
            window_radius: self.window_radius.unwrap_or(defaults.window_radius),
            whole_word: self.whole_word.unwrap_or(defaults.whole_word),
            non_author_words: self.non_author_words,
        })
    }
}
