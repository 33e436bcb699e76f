//! Keyword index over the parsed FAQ records.
//!
//! Built once at startup (or on reload) and then read-only: the pipeline
//! shares it behind an `Arc` so concurrent queries never contend.
//! Rebuilding from identical input is deterministic: keyword sets are
//! ordered and postings follow parse order.

use std::collections::{BTreeSet, HashMap};

use tanya_core::types::FaqRecord;

/// Terms shorter than this carry no signal.
const MIN_TERM_LEN: usize = 2;

/// Small fixed stopword set, Malay + English function words. Question
/// words ("berapa", "bagaimana", "how") are kept; the pattern tier and
/// ranker both use them.
const STOPWORDS: &[&str] = &[
    // Malay
    "yang", "dan", "untuk", "dengan", "adalah", "atau", "di", "ke", "dari", "ini", "itu",
    "pada", "dalam", "bagi", "saya", "anda", "akan", "telah", "ada", "juga", "sila",
    // English
    "the", "a", "an", "is", "are", "was", "to", "of", "and", "or", "for", "in", "on", "at",
    "do", "does", "be", "it", "this", "that", "you", "your", "my", "we", "i",
];

/// Lowercase, split on non-alphanumeric, drop stopwords and short terms.
/// Order-preserving; duplicates retained (callers that want a set use
/// [`keyword_set`]).
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TERM_LEN && !STOPWORDS.contains(t))
        .map(|t| t.to_string())
        .collect()
}

/// Normalized, deduplicated keyword set for a piece of text.
pub fn keyword_set(text: &str) -> BTreeSet<String> {
    tokenize(text).into_iter().collect()
}

/// The read-only keyword index: records plus a term → record-ids map.
pub struct FaqIndex {
    records: Vec<FaqRecord>,
    postings: HashMap<String, Vec<usize>>,
}

impl FaqIndex {
    /// Populate each record's keyword sets and build the posting lists.
    /// Idempotent for identical input.
    pub fn build(mut records: Vec<FaqRecord>) -> Self {
        let mut postings: HashMap<String, Vec<usize>> = HashMap::new();

        for (id, record) in records.iter_mut().enumerate() {
            record.id = id;
            record.question_keywords = keyword_set(&record.question);
            record.keywords = keyword_set(&record.question);
            record.keywords.extend(keyword_set(&record.answer));

            for term in &record.keywords {
                postings.entry(term.clone()).or_default().push(id);
            }
        }

        tracing::debug!(
            "Index built: {} records, {} distinct terms",
            records.len(),
            postings.len()
        );
        Self { records, postings }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, id: usize) -> Option<&FaqRecord> {
        self.records.get(id)
    }

    pub fn records(&self) -> &[FaqRecord] {
        &self.records
    }

    /// Record ids containing a term, in parse order. Empty slice if unseen.
    pub fn postings(&self, term: &str) -> &[usize] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Inverse document frequency: rarer terms contribute more to a
    /// record's score. `ln(1 + N/df)`, 0 for unseen terms.
    pub fn idf(&self, term: &str) -> f64 {
        let df = self.postings(term).len();
        if df == 0 {
            return 0.0;
        }
        (1.0 + self.records.len() as f64 / df as f64).ln()
    }
}
