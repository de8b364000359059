use std::collections::HashSet;

use once_cell::sync::Lazy;

use citescan_core::Sentence;

/// Abbreviations (lowercase, without the final period) whose period never
/// ends a sentence. "et al." and single-letter initials are handled separately.
pub(crate) const DEFAULT_ABBREVIATIONS: &[&str] = &[
    "dr", "mr", "mrs", "ms", "prof", "vs", "i.e", "e.g", "cf", "fig", "no", "vol", "pp", "ed",
    "eds",
];

static DEFAULT_ABBREVIATION_SET: Lazy<HashSet<String>> = Lazy::new(|| {
    DEFAULT_ABBREVIATIONS
        .iter()
        .map(|s| s.to_string())
        .collect()
});

/// Split cleaned text into sentences using the default abbreviation list.
///
/// A sentence ends after `.`, `!` or `?` (plus any closing quotes or brackets)
/// when followed by whitespace and a capitalized token, or by the end of the
/// text. A paragraph break (two or more newlines) always ends a sentence.
/// A period does not end a sentence after "et al", after a single capital
/// letter (an initial), after a known abbreviation, or before a digit.
///
/// Text without any boundary yields a single sentence; only whitespace-only
/// input yields none.
pub fn segment_sentences(text: &str) -> Vec<Sentence> {
    segment_sentences_with(text, &DEFAULT_ABBREVIATION_SET)
}

/// Like [`segment_sentences`] with an explicit abbreviation set (lowercase,
/// no trailing period).
pub fn segment_sentences_with(text: &str, abbreviations: &HashSet<String>) -> Vec<Sentence> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start: Option<usize> = None;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];

        if c.is_whitespace() {
            let run_end = skip_whitespace(&chars, i);
            if let Some(s) = start
                && newline_count(&chars[i..run_end]) >= 2
            {
                push_sentence(&mut sentences, text, s, pos);
                start = None;
            }
            i = run_end;
            continue;
        }

        if start.is_none() {
            start = Some(pos);
        }

        if matches!(c, '.' | '!' | '?') {
            let mut j = i + 1;
            while j < chars.len() && is_terminal_tail(chars[j].1) {
                j += 1;
            }
            if is_boundary(text, &chars, i, j, abbreviations) {
                let end = chars.get(j).map_or(text.len(), |&(p, _)| p);
                if let Some(s) = start.take() {
                    push_sentence(&mut sentences, text, s, end);
                }
            }
            i = j;
            continue;
        }

        i += 1;
    }

    if let Some(s) = start {
        let end = text.trim_end().len();
        push_sentence(&mut sentences, text, s, end);
    }

    sentences
}

fn push_sentence(sentences: &mut Vec<Sentence>, text: &str, start: usize, end: usize) {
    sentences.push(Sentence {
        index: sentences.len(),
        start_offset: start,
        end_offset: end,
        text: text[start..end].to_string(),
    });
}

fn skip_whitespace(chars: &[(usize, char)], mut i: usize) -> usize {
    while i < chars.len() && chars[i].1.is_whitespace() {
        i += 1;
    }
    i
}

fn newline_count(run: &[(usize, char)]) -> usize {
    run.iter().filter(|&&(_, c)| c == '\n').count()
}

/// Characters that may trail a terminal mark and still belong to the sentence.
fn is_terminal_tail(c: char) -> bool {
    matches!(
        c,
        '.' | '!' | '?' | '"' | '\'' | '\u{201D}' | '\u{2019}' | ')' | ']'
    )
}

fn is_opening(c: char) -> bool {
    matches!(c, '(' | '[' | '"' | '\'' | '\u{201C}' | '\u{2018}')
}

/// Decide whether the terminal mark at `chars[mark]` (with its tail ending
/// before `chars[after]`) closes a sentence.
fn is_boundary(
    text: &str,
    chars: &[(usize, char)],
    mark: usize,
    after: usize,
    abbreviations: &HashSet<String>,
) -> bool {
    if after >= chars.len() {
        return true;
    }
    if !chars[after].1.is_whitespace() {
        return false;
    }

    let next = skip_whitespace(chars, after);
    if next >= chars.len() {
        return true;
    }

    let starts_capitalized = match chars[next].1 {
        c if c.is_uppercase() => true,
        c if is_opening(c) => chars.get(next + 1).is_some_and(|&(_, n)| n.is_uppercase()),
        _ => false,
    };
    if !starts_capitalized {
        return false;
    }

    if chars[mark].1 == '.' {
        let before = &text[..chars[mark].0];
        if ends_with_et_al(before) || ends_with_initial(before) {
            return false;
        }
        if ends_with_abbreviation(before, abbreviations) {
            return false;
        }
        if chars
            .get(mark + 1)
            .is_some_and(|&(_, c)| c.is_ascii_digit())
        {
            return false;
        }
    }

    true
}

fn ends_with_et_al(before: &str) -> bool {
    let Some(split) = before.len().checked_sub(5) else {
        return false;
    };
    let (Some(head), Some(tail)) = (before.get(..split), before.get(split..)) else {
        return false;
    };
    tail.eq_ignore_ascii_case("et al") && head.chars().last().is_none_or(|c| !c.is_alphanumeric())
}

fn ends_with_initial(before: &str) -> bool {
    let mut rev = before.chars().rev();
    match (rev.next(), rev.next()) {
        (Some(c), prev) => c.is_uppercase() && prev.is_none_or(|p| !p.is_alphabetic()),
        _ => false,
    }
}

fn ends_with_abbreviation(before: &str, abbreviations: &HashSet<String>) -> bool {
    let token_start = before
        .char_indices()
        .rev()
        .take_while(|&(_, c)| c.is_alphabetic() || c == '.')
        .last()
        .map_or(before.len(), |(i, _)| i);
    let token = before[token_start..].trim_start_matches('.');
    !token.is_empty() && abbreviations.contains(&token.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str) -> Vec<String> {
        segment_sentences(text)
            .into_iter()
            .map(|s| s.text)
            .collect()
    }

    #[test]
    fn test_basic_split() {
        assert_eq!(
            texts("First sentence here. Second one follows! Third? yes lowercase. Fourth."),
            vec![
                "First sentence here.",
                "Second one follows!",
                "Third? yes lowercase.",
                "Fourth."
            ]
        );
    }

    #[test]
    fn test_et_al_is_not_a_boundary() {
        assert_eq!(
            texts("As shown by Smith et al. Jones later disagreed. Done."),
            vec!["As shown by Smith et al. Jones later disagreed.", "Done."]
        );
        assert_eq!(
            texts("This finding confirms Smith et al., 2010."),
            vec!["This finding confirms Smith et al., 2010."]
        );
        assert_eq!(texts("See Lee ET AL. Kim agrees."), vec!["See Lee ET AL. Kim agrees."]);
    }

    #[test]
    fn test_initials_are_not_boundaries() {
        assert_eq!(
            texts("As argued by J. K. Rowling in 2001. Next point."),
            vec!["As argued by J. K. Rowling in 2001.", "Next point."]
        );
    }

    #[test]
    fn test_abbreviations() {
        assert_eq!(
            texts("See Fig. Three shows it. Compare e.g. Smith, 2005. Done."),
            vec!["See Fig. Three shows it.", "Compare e.g. Smith, 2005.", "Done."]
        );
        assert_eq!(
            texts("Ask Dr. Adams. Then leave."),
            vec!["Ask Dr. Adams.", "Then leave."]
        );
    }

    #[test]
    fn test_custom_abbreviation_set() {
        let abbrevs: HashSet<String> = ["approx".to_string()].into_iter().collect();
        let out: Vec<String> = segment_sentences_with("It was approx. Ten units.", &abbrevs)
            .into_iter()
            .map(|s| s.text)
            .collect();
        assert_eq!(out, vec!["It was approx. Ten units."]);
    }

    #[test]
    fn test_decimals() {
        assert_eq!(
            texts("The effect was 3.5 times larger. Version 2.0 Shipped."),
            vec!["The effect was 3.5 times larger.", "Version 2.0 Shipped."]
        );
    }

    #[test]
    fn test_closing_quote_and_paren_stay_with_sentence() {
        assert_eq!(
            texts("He said \"stop.\" Then (Smith, 2005). After that."),
            vec!["He said \"stop.\"", "Then (Smith, 2005).", "After that."]
        );
    }

    #[test]
    fn test_opening_bracket_before_capital() {
        assert_eq!(
            texts("Prior work. (Smith, 2005; Jones et al., 2012) both agree."),
            vec!["Prior work.", "(Smith, 2005; Jones et al., 2012) both agree."]
        );
    }

    #[test]
    fn test_paragraph_break_is_boundary() {
        assert_eq!(
            texts("Introduction\n\nThe finding holds"),
            vec!["Introduction", "The finding holds"]
        );
    }

    #[test]
    fn test_no_terminal_punctuation_yields_one_sentence() {
        let s = segment_sentences("  no punctuation at all here  ");
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].text, "no punctuation at all here");
        assert_eq!(s[0].start_offset, 2);
        assert_eq!(s[0].end_offset, 28);
    }

    #[test]
    fn test_whitespace_only_yields_nothing() {
        assert!(segment_sentences("   \n\n ").is_empty());
        assert!(segment_sentences("").is_empty());
    }

    #[test]
    fn test_offsets_are_monotonic_and_exact() {
        let text = "Über alles. Ça va? Ja.\n\nNeuer Absatz hier.";
        let sentences = segment_sentences(text);
        assert_eq!(sentences.len(), 4);
        let mut prev_end = 0;
        for (i, s) in sentences.iter().enumerate() {
            assert_eq!(s.index, i);
            assert!(s.start_offset >= prev_end);
            assert!(s.end_offset > s.start_offset);
            assert_eq!(&text[s.start_offset..s.end_offset], s.text);
            prev_end = s.end_offset;
        }
    }
}
