use std::collections::HashSet;

use crate::{CitationCandidate, ReferenceList};

/// First-seen-wins deduplication of citation candidates.
///
/// Candidates must be pushed in request order (document by document, window by
/// window). A candidate whose `normalized_key` was already seen is dropped,
/// even if its `raw_text` differs in case or spacing.
#[derive(Debug, Default)]
pub struct ReferenceAggregator {
    seen: HashSet<String>,
    entries: Vec<String>,
}

impl ReferenceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a candidate. Returns `true` if it was new.
    pub fn push(&mut self, candidate: CitationCandidate) -> bool {
        if self.seen.contains(&candidate.normalized_key) {
            return false;
        }
        self.seen.insert(candidate.normalized_key);
        self.entries.push(candidate.raw_text);
        true
    }

    /// Record every candidate in order. Returns how many were new.
    pub fn extend<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = CitationCandidate>,
    {
        let mut added = 0;
        for candidate in candidates {
            if self.push(candidate) {
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn finish(self) -> ReferenceList {
        ReferenceList {
            entries: self.entries,
        }
    }
}
