use std::io::Write;

use citescan_core::{ExtractionReport, FileOutcome, FileReport, Sentence};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the per-file accounting line for each input.
pub fn print_file_reports(
    w: &mut dyn Write,
    files: &[FileReport],
    color: ColorMode,
) -> std::io::Result<()> {
    for file in files {
        match &file.outcome {
            FileOutcome::Processed {
                sentences,
                keyword_sentences,
                candidates,
            } => {
                let detail = format!(
                    "{sentences} sentences, {keyword_sentences} with keyword, {candidates} citations nearby"
                );
                if color.enabled() {
                    writeln!(w, "{} {} {}", "OK".green(), file.name.bold(), detail.dimmed())?;
                } else {
                    writeln!(w, "OK {} ({})", file.name, detail)?;
                }
            }
            FileOutcome::Skipped { reason } => {
                if color.enabled() {
                    writeln!(w, "{} {}: {}", "SKIPPED".yellow(), file.name.bold(), reason)?;
                } else {
                    writeln!(w, "SKIPPED {}: {}", file.name, reason)?;
                }
            }
        }
    }
    Ok(())
}

/// Print the extracted references with a summary header.
pub fn print_report(
    w: &mut dyn Write,
    report: &ExtractionReport,
    keyword: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    print_file_reports(w, &report.files, color)?;
    writeln!(w)?;

    let total = report.references.len();
    let header = format!(
        "Found {} citation{} near \"{}\" in {} of {} files",
        total,
        if total == 1 { "" } else { "s" },
        keyword,
        report.processed_count(),
        report.files.len()
    );
    if color.enabled() {
        writeln!(w, "{}", header.bold())?;
    } else {
        writeln!(w, "{}", header)?;
    }

    if total == 0 {
        return Ok(());
    }

    writeln!(w)?;
    let width = total.to_string().len();
    for (i, reference) in report.references.iter().enumerate() {
        if color.enabled() {
            writeln!(w, "{:>width$}. {}", i + 1, reference.cyan())?;
        } else {
            writeln!(w, "{:>width$}. {}", i + 1, reference)?;
        }
    }
    Ok(())
}

/// One sentence of the `inspect` listing.
pub struct InspectedSentence<'a> {
    pub sentence: &'a Sentence,
    pub has_keyword: bool,
    pub citations: Vec<String>,
}

/// Print cleaned text as numbered sentences, marking keyword sentences and
/// listing the citations each sentence contains.
pub fn print_sentences(
    w: &mut dyn Write,
    file_name: &str,
    sentences: &[InspectedSentence<'_>],
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} ({} sentences)\n", file_name.bold(), sentences.len())?;
    } else {
        writeln!(w, "{} ({} sentences)\n", file_name, sentences.len())?;
    }

    let width = sentences.len().to_string().len();
    for item in sentences {
        let idx = item.sentence.index;
        let marker = if item.has_keyword { "*" } else { " " };
        if color.enabled() && item.has_keyword {
            writeln!(w, "{marker}[{idx:>width$}] {}", item.sentence.text.green())?;
        } else {
            writeln!(w, "{marker}[{idx:>width$}] {}", item.sentence.text)?;
        }
        for citation in &item.citations {
            if color.enabled() {
                writeln!(w, "  {:width$}   {}", "", format!("-> {citation}").dimmed())?;
            } else {
                writeln!(w, "  {:width$}   -> {citation}", "")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use citescan_core::{CitationCandidate, ReferenceAggregator, SkipReason};

    fn report() -> ExtractionReport {
        let mut agg = ReferenceAggregator::new();
        agg.push(CitationCandidate {
            raw_text: "Smith et al., 2010".into(),
            normalized_key: "smith et al., 2010".into(),
        });
        ExtractionReport {
            references: agg.finish(),
            files: vec![
                FileReport {
                    name: "a.docx".into(),
                    outcome: FileOutcome::Processed {
                        sentences: 4,
                        keyword_sentences: 1,
                        candidates: 1,
                    },
                },
                FileReport {
                    name: "b.pdf".into(),
                    outcome: FileOutcome::Skipped {
                        reason: SkipReason::Decode("unsupported file type: b.pdf".into()),
                    },
                },
            ],
        }
    }

    #[test]
    fn test_plain_report() {
        let mut out = Vec::new();
        print_report(&mut out, &report(), "finding", ColorMode(false)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("OK a.docx (4 sentences, 1 with keyword, 1 citations nearby)"));
        assert!(text.contains("SKIPPED b.pdf: unsupported file type: b.pdf"));
        assert!(text.contains("Found 1 citation near \"finding\" in 1 of 2 files"));
        assert!(text.contains("1. Smith et al., 2010"));
    }

    #[test]
    fn test_plain_sentences() {
        let s = Sentence {
            index: 0,
            start_offset: 0,
            end_offset: 9,
            text: "A finding".into(),
        };
        let items = [InspectedSentence {
            sentence: &s,
            has_keyword: true,
            citations: vec!["Smith, 2005".into()],
        }];
        let mut out = Vec::new();
        print_sentences(&mut out, "a.txt", &items, ColorMode(false)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("*[0] A finding"));
        assert!(text.contains("-> Smith, 2005"));
    }
}
