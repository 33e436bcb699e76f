//! Incoming query normalization and language detection.

use tanya_core::types::{Language, LanguageHint};

use crate::index::tokenize;

/// Marker words that strongly suggest Malay.
const MS_MARKERS: &[&str] = &[
    "apakah", "bagaimana", "bagaimanakah", "berapa", "berapakah", "adakah", "bila", "siapa",
    "mana", "kenapa", "mengapa", "bayaran", "permohonan", "syarat", "cara", "mohon", "boleh",
    "saya", "anda", "tidak", "yang", "untuk", "dengan", "dan", "kos", "rosak",
];

/// Marker words that strongly suggest English.
const EN_MARKERS: &[&str] = &[
    "what", "how", "where", "when", "who", "why", "which", "much", "many", "the", "is", "are",
    "can", "do", "does", "apply", "cost", "fee", "requirement", "document", "and", "for",
];

/// Detect ms/en from marker-word counts. Malay wins ties; it is the
/// knowledge base's primary language.
pub fn detect_language(text: &str) -> Language {
    let mut ms = 0usize;
    let mut en = 0usize;
    for word in text.to_lowercase().split(|c: char| !c.is_alphanumeric()) {
        if MS_MARKERS.contains(&word) {
            ms += 1;
        }
        if EN_MARKERS.contains(&word) {
            en += 1;
        }
    }
    if en > ms { Language::En } else { Language::Ms }
}

/// A normalized incoming question. Created per request, never persisted.
#[derive(Debug, Clone)]
pub struct Query {
    pub raw: String,
    /// Lowercased, whitespace-collapsed form used for substring and
    /// signature matching.
    pub normalized: String,
    /// Ordered normalized tokens (stopwords removed).
    pub tokens: Vec<String>,
    pub language: Language,
}

impl Query {
    pub fn new(raw: &str, hint: LanguageHint) -> Self {
        let normalized = raw
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let language = match hint {
            LanguageHint::Ms => Language::Ms,
            LanguageHint::En => Language::En,
            LanguageHint::Auto => detect_language(raw),
        };
        Self {
            raw: raw.to_string(),
            tokens: tokenize(raw),
            normalized,
            language,
        }
    }

    /// True when no usable tokens survive normalization. The pipeline
    /// short-circuits these straight to the fallback tier.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
