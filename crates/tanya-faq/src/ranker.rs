//! Relevance ranking of FAQ records against a query.
//!
//! A plain match count over-ranks long answers that happen to mention
//! many common words, so the score is idf-weighted and biased toward
//! records whose *question* is about the query's topic. The exact weights
//! are tunable, not contractual.

use std::collections::{BTreeMap, BTreeSet};

use tanya_core::error::{Result, TanyaError};
use tanya_core::types::ScoredCandidate;

use crate::index::FaqIndex;
use crate::query::Query;

/// Bonus when the full normalized query appears verbatim in a question.
const PHRASE_BONUS: f64 = 5.0;
/// Per-keyword bonus when the match sits in the question, not only the answer.
const QUESTION_TERM_BONUS: f64 = 0.5;

/// Rank every record sharing at least one keyword with the query, best
/// first. Ties keep parse order, so repeated ranking of the same query
/// against the same index is byte-for-byte deterministic.
pub fn rank(index: &FaqIndex, query: &Query) -> Result<Vec<ScoredCandidate>> {
    if query.is_empty() {
        return Err(TanyaError::EmptyQuery);
    }

    // keyword → matched records; BTreeMap keeps candidates in parse order
    // before scoring so the stable sort below breaks ties deterministically.
    let mut matched: BTreeMap<usize, BTreeSet<String>> = BTreeMap::new();
    for token in &query.tokens {
        for &id in index.postings(token) {
            matched.entry(id).or_default().insert(token.clone());
        }
    }

    let mut candidates: Vec<ScoredCandidate> = matched
        .into_iter()
        .filter_map(|(record_id, terms)| {
            let record = index.record(record_id)?;
            let mut score: f64 = terms.iter().map(|t| index.idf(t)).sum();
            score += terms
                .iter()
                .filter(|t| record.question_keywords.contains(*t))
                .count() as f64
                * QUESTION_TERM_BONUS;
            if record.question.to_lowercase().contains(&query.normalized) {
                score += PHRASE_BONUS;
            }
            Some(ScoredCandidate {
                record_id,
                score,
                matched: terms,
            })
        })
        .collect();

    // Stable sort: equal scores stay in parse order.
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tanya_core::types::{FaqRecord, LanguageHint};

    fn index() -> FaqIndex {
        FaqIndex::build(vec![
            FaqRecord::new(
                "Kos gantian IC".into(),
                "RM10 selepas 1 tahun dari tarikh penyerahan kad".into(),
                "JPN".into(),
            ),
            FaqRecord::new(
                "Syarat permohonan pasport".into(),
                "Kad pengenalan asal dan sijil kelahiran diperlukan".into(),
                "JIM".into(),
            ),
            FaqRecord::new(
                "Cara menyertai APMM".into(),
                "Permohonan dibuat melalui SPA menggunakan borang SPA8i".into(),
                "APMM".into(),
            ),
        ])
    }

    fn query(text: &str) -> Query {
        Query::new(text, LanguageHint::Auto)
    }

    #[test]
    fn test_unique_match_ranks_first() {
        // "ic" appears only in record 0's question.
        let ranked = rank(&index(), &query("gantian ic")).unwrap();
        assert_eq!(ranked[0].record_id, 0);
        assert!(ranked[0].score > 0.0);
    }

    #[test]
    fn test_zero_overlap_is_empty() {
        let ranked = rank(&index(), &query("asdkjaslkdj gibberish")).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_empty_query_errors() {
        assert!(matches!(
            rank(&index(), &query("   ")),
            Err(TanyaError::EmptyQuery)
        ));
    }

    #[test]
    fn test_deterministic() {
        let idx = index();
        let q = query("permohonan kad");
        let a = rank(&idx, &q).unwrap();
        let b = rank(&idx, &q).unwrap();
        let ids_a: Vec<_> = a.iter().map(|c| c.record_id).collect();
        let ids_b: Vec<_> = b.iter().map(|c| c.record_id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_ties_keep_parse_order() {
        let idx = FaqIndex::build(vec![
            FaqRecord::new(
                "Waktu operasi kaunter utama".into(),
                "Kaunter dibuka setiap hari bekerja sepanjang tahun".into(),
                "JPN".into(),
            ),
            FaqRecord::new(
                "Waktu operasi kaunter cawangan".into(),
                "Kaunter dibuka setiap hari bekerja sepanjang tahun".into(),
                "JPN".into(),
            ),
        ]);
        let ranked = rank(&idx, &query("waktu kaunter")).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].record_id, 0);
        assert_eq!(ranked[1].record_id, 1);
    }

    #[test]
    fn test_question_match_outranks_answer_match() {
        // "permohonan" sits in record 1's question but only in record 2's
        // answer; the query should prefer the record that is *about* it.
        let ranked = rank(&index(), &query("permohonan")).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].record_id, 1);
        assert_eq!(ranked[1].record_id, 2);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_phrase_containment_bonus() {
        let idx = FaqIndex::build(vec![
            FaqRecord::new(
                "Permohonan lesen memandu baharu".into(),
                "Permohonan lesen dibuat di JPJ dengan borang yang lengkap".into(),
                "JPJ".into(),
            ),
            FaqRecord::new(
                "Pembaharuan lesen".into(),
                "Lesen memandu boleh diperbaharui dalam talian atau di kaunter".into(),
                "JPJ".into(),
            ),
        ]);
        let ranked = rank(&idx, &query("lesen memandu")).unwrap();
        // Record 0 contains the full phrase "lesen memandu" in its question.
        assert_eq!(ranked[0].record_id, 0);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_matched_keywords_recorded() {
        let ranked = rank(&index(), &query("gantian ic")).unwrap();
        assert!(ranked[0].matched.contains("ic"));
        assert!(ranked[0].matched.contains("gantian"));
    }
}
