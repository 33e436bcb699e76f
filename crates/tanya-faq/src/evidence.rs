//! Evidence assembly: bound and classify the ranked candidates before
//! synthesis.
//!
//! The confidence level is a pure function of the top score and its
//! separation from the runner-up; the orchestrator uses it to decide
//! whether synthesis is worth attempting at all. Thresholds are tunable.

use tanya_core::types::{Confidence, EvidenceBundle, EvidenceItem, ScoredCandidate};

use crate::index::FaqIndex;

/// Bounded evidence set size.
const TOP_K: usize = 5;
/// Candidates scoring below this never reach the prompt.
const SCORE_FLOOR: f64 = 0.5;
/// Top score needed for "high" confidence…
const HIGH_THRESHOLD: f64 = 8.0;
/// …together with this margin over the runner-up.
const HIGH_SEPARATION: f64 = 2.0;
/// Top score needed for "medium" confidence.
const MEDIUM_THRESHOLD: f64 = 2.0;
/// Per-record character budget for answer text in the prompt.
const ANSWER_CHAR_BUDGET: usize = 1200;

/// Select the top-K candidates above the floor and classify them.
pub fn assemble(index: &FaqIndex, ranked: &[ScoredCandidate]) -> EvidenceBundle {
    let items: Vec<EvidenceItem> = ranked
        .iter()
        .filter(|c| c.score >= SCORE_FLOOR)
        .take(TOP_K)
        .filter_map(|c| {
            let record = index.record(c.record_id)?;
            Some(EvidenceItem {
                question: record.question.clone(),
                answer: truncate_chars(&record.answer, ANSWER_CHAR_BUDGET).to_string(),
                source_tag: record.source_tag.clone(),
                score: c.score,
            })
        })
        .collect();

    let confidence = classify(&items);
    EvidenceBundle { items, confidence }
}

/// Pure confidence classification over the already-filtered items.
fn classify(items: &[EvidenceItem]) -> Confidence {
    let Some(top) = items.first() else {
        return Confidence::None;
    };
    let second = items.get(1).map(|i| i.score).unwrap_or(0.0);
    if top.score >= HIGH_THRESHOLD && top.score - second >= HIGH_SEPARATION {
        Confidence::High
    } else if top.score >= MEDIUM_THRESHOLD {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Truncate at a character boundary (UTF-8 safe).
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}
