//! The tiered answer pipeline.
//!
//! Four tiers, strictly ordered, first success wins:
//! 1. curated table (exact high-stakes answers)
//! 2. pattern routes (known paraphrases)
//! 3. retrieval + synthesis (skipped when confidence is `None` or no
//!    synthesizer is configured)
//! 4. fixed not-found answer with a contact directory (never fails)
//!
//! A failed tier is logged and control passes on unconditionally; the
//! caller never sees an error. The keyword index is shared read-only
//! state, rebuilt off to the side on reload and swapped atomically.

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use tanya_core::error::{Result, TanyaError};
use tanya_core::types::{Answer, AnswerTier, Confidence, LanguageHint};

use crate::evidence;
use crate::hardcoded;
use crate::index::FaqIndex;
use crate::parser::DocumentParser;
use crate::patterns::PatternRouter;
use crate::query::Query;
use crate::ranker;
use crate::synthesis::SynthesisAdapter;

const FALLBACK_NOT_FOUND: &str =
    "Maaf, maklumat spesifik untuk soalan anda tidak ditemui dalam pangkalan data FAQ.\n\n\
     Untuk maklumat lanjut, sila hubungi agensi yang berkaitan:";

const CONTACTS_IC: &str = "\n\nJabatan Pendaftaran Negara (JPN):\n\
     • Laman web: https://www.jpn.gov.my\n\
     • Talian: 1-300-88-4444";

const CONTACTS_APMM: &str = "\n\nAgensi Penguatkuasaan Maritim Malaysia (APMM):\n\
     • Laman web: https://www.apmm.gov.my\n\
     • Permohonan melalui SPA: https://www.spa.gov.my";

const CONTACTS_GENERAL: &str = "\n\nJPN: 1-300-88-4444\n\
     PDRM: 03-2266 2222\n\
     Jabatan Imigresen Malaysia: 03-8880 1000";

pub struct FaqPipeline {
    index: RwLock<Arc<FaqIndex>>,
    parser: DocumentParser,
    patterns: PatternRouter,
    adapter: Option<SynthesisAdapter>,
}

impl FaqPipeline {
    /// Build the pipeline from the raw knowledge-base document.
    ///
    /// Zero parsed records is startup-fatal: the retrieval and synthesis
    /// tiers would be dead weight, so the operator must be told.
    pub fn from_document(text: &str, adapter: Option<SynthesisAdapter>) -> Result<Self> {
        let parser = DocumentParser::new();
        let records = parser.parse(text);
        if records.is_empty() {
            return Err(TanyaError::Knowledge(
                "no FAQ records parsed from knowledge-base document".into(),
            ));
        }
        Ok(Self {
            index: RwLock::new(Arc::new(FaqIndex::build(records))),
            parser,
            patterns: PatternRouter::new(),
            adapter,
        })
    }

    /// Records currently indexed.
    pub fn record_count(&self) -> usize {
        self.current_index().len()
    }

    /// Re-parse and re-index a changed document. The new index is built
    /// off to the side and swapped in atomically; concurrent readers keep
    /// the old one until the swap. An empty document leaves the current
    /// index untouched.
    pub fn reload(&self, text: &str) -> Result<usize> {
        let records = self.parser.parse(text);
        if records.is_empty() {
            return Err(TanyaError::Knowledge(
                "reload rejected: document parsed to zero records".into(),
            ));
        }
        let fresh = Arc::new(FaqIndex::build(records));
        let count = fresh.len();
        match self.index.write() {
            Ok(mut guard) => *guard = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }
        tracing::info!("Knowledge base reloaded: {count} records");
        Ok(count)
    }

    fn current_index(&self) -> Arc<FaqIndex> {
        match self.index.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Answer a user question. Never fails, never blocks beyond the
    /// synthesis timeout.
    pub async fn answer(&self, raw: &str, hint: LanguageHint) -> Answer {
        let query = Query::new(raw, hint);

        // Tier 1: curated. A matching signature wins even when a
        // higher-scoring retrieval path exists.
        if let Some(answer) = hardcoded::lookup(&query) {
            tracing::info!("Answered at tier 1 (hardcoded)");
            return answer;
        }

        // Tier 2: pattern routes.
        if let Some(answer) = self.patterns.route(&query) {
            tracing::info!("Answered at tier 2 (pattern)");
            return answer;
        }

        // Tier 3: retrieval + synthesis.
        if let Some(answer) = self.try_synthesis(&query).await {
            tracing::info!("Answered at tier 3 (synthesized)");
            return answer;
        }

        // Tier 4: guaranteed default.
        tracing::info!("Answered at tier 4 (fallback)");
        fallback_answer(&query)
    }

    async fn try_synthesis(&self, query: &Query) -> Option<Answer> {
        let adapter = self.adapter.as_ref()?;
        let index = self.current_index();

        let ranked = match ranker::rank(&index, query) {
            Ok(ranked) => ranked,
            Err(TanyaError::EmptyQuery) => {
                tracing::debug!("Empty query, skipping retrieval");
                return None;
            }
            Err(e) => {
                tracing::warn!("Ranking failed: {e}");
                return None;
            }
        };

        let bundle = evidence::assemble(&index, &ranked);
        if bundle.confidence == Confidence::None {
            tracing::debug!("No usable evidence, skipping synthesis");
            return None;
        }

        match adapter.answer(query, &bundle).await {
            Ok(answer) => Some(answer),
            Err(e) => {
                tracing::warn!("Synthesis failed, falling through: {e}");
                None
            }
        }
    }
}

/// The tier-4 default: a fixed not-found statement plus a contact
/// directory picked by topic. Sources stay empty; no record backs this
/// answer.
fn fallback_answer(query: &Query) -> Answer {
    let q = &query.normalized;
    let contacts = if ["ic", "kad pengenalan", "mykad", "cip"]
        .iter()
        .any(|kw| q.contains(kw))
    {
        CONTACTS_IC
    } else if q.contains("apmm") || q.contains("maritim") {
        CONTACTS_APMM
    } else {
        CONTACTS_GENERAL
    };

    Answer::new(
        format!("{FALLBACK_NOT_FOUND}{contacts}"),
        BTreeSet::new(),
        AnswerTier::Fallback,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "## KAD PENGENALAN\n\nQ: Kos gantian IC?\nA: RM10 selepas 1 tahun dari tarikh penyerahan kad.\n";

    #[test]
    fn test_zero_records_is_fatal() {
        assert!(matches!(
            FaqPipeline::from_document("tiada apa-apa di sini", None),
            Err(TanyaError::Knowledge(_))
        ));
    }

    #[test]
    fn test_reload_swaps_index() {
        let pipeline = FaqPipeline::from_document(DOC, None).unwrap();
        assert_eq!(pipeline.record_count(), 1);

        let bigger = format!("{DOC}\nQ: Waktu operasi kaunter?\nA: Lapan pagi hingga lima petang setiap hari bekerja.\n");
        let count = pipeline.reload(&bigger).unwrap();
        assert_eq!(count, 2);
        assert_eq!(pipeline.record_count(), 2);
    }

    #[test]
    fn test_reload_rejects_empty_document() {
        let pipeline = FaqPipeline::from_document(DOC, None).unwrap();
        assert!(pipeline.reload("").is_err());
        // Old index stays in place.
        assert_eq!(pipeline.record_count(), 1);
    }

    #[tokio::test]
    async fn test_fallback_topic_contacts() {
        let pipeline = FaqPipeline::from_document(DOC, None).unwrap();

        let answer = pipeline.answer("soalan maritim tiada jawapan", LanguageHint::Auto).await;
        assert_eq!(answer.tier, AnswerTier::Fallback);
        assert!(answer.text.contains("apmm.gov.my"));
        assert!(answer.sources.is_empty());
    }
}
