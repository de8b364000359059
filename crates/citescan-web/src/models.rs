use serde::Serialize;

use citescan_core::{ExtractionReport, ReferenceList};

// ── Response bodies ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ExtractResponse {
    pub references: ReferenceList,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub file: String,
    pub reason: String,
}

impl From<ExtractionReport> for ExtractResponse {
    fn from(report: ExtractionReport) -> Self {
        let skipped = report
            .files
            .iter()
            .filter_map(|f| {
                f.skip_reason().map(|reason| SkippedFile {
                    file: f.name.clone(),
                    reason: reason.to_string(),
                })
            })
            .collect();
        Self {
            references: report.references,
            skipped,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use citescan_core::{CitationCandidate, FileOutcome, FileReport, ReferenceAggregator, SkipReason};

    #[test]
    fn test_extract_response_lists_only_skipped_files() {
        let mut agg = ReferenceAggregator::new();
        agg.push(CitationCandidate {
            raw_text: "Brown, 1999".into(),
            normalized_key: "brown, 1999".into(),
        });
        let report = ExtractionReport {
            references: agg.finish(),
            files: vec![
                FileReport {
                    name: "a.txt".into(),
                    outcome: FileOutcome::Processed {
                        sentences: 2,
                        keyword_sentences: 1,
                        candidates: 1,
                    },
                },
                FileReport {
                    name: "b.txt".into(),
                    outcome: FileOutcome::Skipped {
                        reason: SkipReason::EmptyDocument,
                    },
                },
            ],
        };

        let json = serde_json::to_value(ExtractResponse::from(report)).unwrap();
        assert_eq!(json["references"], serde_json::json!(["Brown, 1999"]));
        assert_eq!(json["skipped"].as_array().unwrap().len(), 1);
        assert_eq!(json["skipped"][0]["file"], "b.txt");
        assert!(json["skipped"][0]["reason"].as_str().unwrap().contains("references"));
    }
}
