//! Data model for the FAQ answering pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One parsed question/answer unit from the knowledge-base document.
///
/// Immutable once the index is built. `keywords` and `question_keywords`
/// are empty after parsing and populated by the index builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqRecord {
    /// Position in parse order. Doubles as the tie-breaker for ranking.
    pub id: usize,
    pub question: String,
    pub answer: String,
    /// Short agency label ("JPN", "PDRM", …) derived from the nearest
    /// preceding section header; "unknown" if none.
    pub source_tag: String,
    /// Normalized search terms from question + answer.
    pub keywords: BTreeSet<String>,
    /// Subset of `keywords` that occur in the question text.
    pub question_keywords: BTreeSet<String>,
}

impl FaqRecord {
    pub fn new(question: String, answer: String, source_tag: String) -> Self {
        Self {
            id: 0,
            question,
            answer,
            source_tag,
            keywords: BTreeSet::new(),
            question_keywords: BTreeSet::new(),
        }
    }
}

/// Caller-supplied hint for the query language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LanguageHint {
    #[default]
    Auto,
    Ms,
    En,
}

/// Resolved query/reply language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Ms,
    En,
}

impl Language {
    pub fn label(&self) -> &'static str {
        match self {
            Language::Ms => "Bahasa Melayu",
            Language::En => "English",
        }
    }
}

/// A record matched against a query, with its relevance score.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    /// Index of the record in the parse-order record store.
    pub record_id: usize,
    pub score: f64,
    /// Query keywords that hit this record.
    pub matched: BTreeSet<String>,
}

/// Coarse classification of how well the top candidates match a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
    Low,
    None,
}

/// One selected (and possibly truncated) record in the evidence set.
#[derive(Debug, Clone)]
pub struct EvidenceItem {
    pub question: String,
    pub answer: String,
    pub source_tag: String,
    pub score: f64,
}

/// The bounded evidence set handed to the synthesizer.
#[derive(Debug, Clone)]
pub struct EvidenceBundle {
    pub items: Vec<EvidenceItem>,
    pub confidence: Confidence,
}

impl EvidenceBundle {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Deduplicated, sorted source tags of the selected evidence.
    pub fn source_tags(&self) -> BTreeSet<String> {
        self.items.iter().map(|i| i.source_tag.clone()).collect()
    }
}

/// Which fallback tier produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerTier {
    Hardcoded,
    Pattern,
    Synthesized,
    Fallback,
}

/// The terminal artifact returned to the caller.
///
/// For every tier except `Fallback`, `sources` is non-empty and drawn only
/// from the records (or curated entries) actually used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub sources: BTreeSet<String>,
    pub tier: AnswerTier,
}

impl Answer {
    pub fn new(text: impl Into<String>, sources: BTreeSet<String>, tier: AnswerTier) -> Self {
        Self {
            text: text.into(),
            sources,
            tier,
        }
    }
}
