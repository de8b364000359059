use rayon::prelude::*;

use citescan_core::{
    CitationCandidate, ExtractionReport, FileOutcome, FileReport, ReferenceAggregator, SkipReason,
};
use citescan_parsing::{CitationExtractor, Keyword, ParsingConfig, ParsingError};

use crate::{IngestError, SourceFile, decode};

/// Extract the deduplicated citations near `keyword` from a set of files.
///
/// The keyword is validated before anything else. Files are decoded and
/// processed in parallel; a file that cannot be decoded, or that has no text
/// left after normalization, is skipped and reported. Citations are merged in
/// input order.
///
/// Fails with [`IngestError::NoFiles`] on empty input and with
/// [`IngestError::AllFilesFailed`] when every file was skipped. Finding no
/// citations is not an error.
pub fn extract_from_files(
    files: &[SourceFile],
    keyword: &str,
    config: &ParsingConfig,
) -> Result<ExtractionReport, IngestError> {
    let extractor = CitationExtractor::with_config(config.clone());
    let keyword = extractor.keyword(keyword).map_err(|e| match e {
        ParsingError::EmptyKeyword => IngestError::EmptyKeyword,
        other => IngestError::InvalidKeyword(other.to_string()),
    })?;

    if files.is_empty() {
        return Err(IngestError::NoFiles);
    }

    let outcomes: Vec<(FileReport, Vec<CitationCandidate>)> = files
        .par_iter()
        .map(|file| process_file(&extractor, file, &keyword))
        .collect();

    let mut aggregator = ReferenceAggregator::new();
    let mut reports = Vec::with_capacity(outcomes.len());
    for (report, candidates) in outcomes {
        aggregator.extend(candidates);
        reports.push(report);
    }

    if reports.iter().all(FileReport::is_skipped) {
        return Err(IngestError::AllFilesFailed { skipped: reports });
    }

    let report = ExtractionReport {
        references: aggregator.finish(),
        files: reports,
    };
    tracing::info!(
        files = files.len(),
        processed = report.processed_count(),
        skipped = report.skipped().count(),
        references = report.references.len(),
        keyword = keyword.as_str(),
        "extraction finished"
    );
    Ok(report)
}

fn process_file(
    extractor: &CitationExtractor,
    file: &SourceFile,
    keyword: &Keyword,
) -> (FileReport, Vec<CitationCandidate>) {
    let skipped = |reason: SkipReason| {
        tracing::warn!(file = %file.name, %reason, "skipping file");
        (
            FileReport {
                name: file.name.clone(),
                outcome: FileOutcome::Skipped { reason },
            },
            Vec::new(),
        )
    };

    let doc = match decode(file) {
        Ok(doc) => doc,
        Err(e) => return skipped(SkipReason::Decode(e.to_string())),
    };

    match extractor.extract_document(&doc, keyword) {
        Ok(found) => (
            FileReport {
                name: file.name.clone(),
                outcome: FileOutcome::Processed {
                    sentences: found.sentence_count,
                    keyword_sentences: found.keyword_matches.len(),
                    candidates: found.candidates.len(),
                },
            },
            found.candidates,
        ),
        Err(ParsingError::EmptyDocument) => skipped(SkipReason::EmptyDocument),
        Err(e) => skipped(SkipReason::Decode(e.to_string())),
    }
}
