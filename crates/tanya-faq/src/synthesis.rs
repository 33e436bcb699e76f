//! Answer synthesis: prompt assembly and post-processing around the
//! external text-generation service.
//!
//! The prompt carries only the selected evidence, never the full
//! document. The model's output is cleaned to plain text, any source
//! claims it invented are dropped, and the citation block is rebuilt
//! from the evidence bundle's tags. The model never gets to cite.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tanya_core::error::{Result, TanyaError};
use tanya_core::traits::{GenerateParams, Synthesizer};
use tanya_core::types::{Answer, AnswerTier, EvidenceBundle, Language};

use crate::query::{detect_language, Query};

/// Build the bounded synthesis prompt from the query and evidence set.
pub fn build_prompt(query: &Query, bundle: &EvidenceBundle) -> String {
    let mut extracts = String::new();
    for (i, item) in bundle.items.iter().enumerate() {
        extracts.push_str(&format!(
            "--- FAQ {} ({}) ---\nQ: {}\nA: {}\n\n",
            i + 1,
            item.source_tag,
            item.question,
            item.answer
        ));
    }

    format!(
        "You are an assistant answering questions about Malaysian government \
         procedures strictly from the FAQ extracts below.\n\n\
         Question: {question}\n\n\
         FAQ extracts:\n{extracts}\
         Rules:\n\
         - Use only facts from the extracts; keep amounts, fees and form names exactly as written.\n\
         - Reply in {language}.\n\
         - Plain text only: no markdown, no symbols for emphasis.\n\
         - If the extracts do not answer the question, say the information is not available.\n\n\
         Answer:",
        question = query.raw.trim(),
        extracts = extracts,
        language = query.language.label(),
    )
}

/// Markdown and source-claim scrubbing for model output.
struct Postprocessor {
    bold: Regex,
    bullet: Regex,
    heading: Regex,
    inline_code: Regex,
    code_fence: Regex,
    blank_runs: Regex,
    source_line: Regex,
}

impl Postprocessor {
    fn new() -> Self {
        Self {
            bold: Regex::new(r"\*\*(.*?)\*\*").expect("bold regex"),
            bullet: Regex::new(r"(?m)^[ \t]*[-*+][ \t]+").expect("bullet regex"),
            heading: Regex::new(r"(?m)^#{1,6}[ \t]+").expect("heading regex"),
            inline_code: Regex::new(r"`([^`]+)`").expect("inline_code regex"),
            code_fence: Regex::new(r"(?s)```[^`]*```").expect("code_fence regex"),
            blank_runs: Regex::new(r"\n\s*\n\s*\n").expect("blank_runs regex"),
            source_line: Regex::new(r"(?i)^[\s•📚]*(sources?|sumber|rujukan)\b\s*:?")
                .expect("source_line regex"),
        }
    }

    /// Reduce model output to plain text and drop any source lines it
    /// produced on its own.
    fn clean(&self, raw: &str) -> String {
        let text = self.code_fence.replace_all(raw, "");
        let text = self.bold.replace_all(&text, "$1");
        let text = self.heading.replace_all(&text, "");
        let text = self.inline_code.replace_all(&text, "$1");
        let text = self.bullet.replace_all(&text, "• ");

        let kept: Vec<&str> = text
            .lines()
            .filter(|line| !self.source_line.is_match(line.trim()))
            .collect();
        let joined = kept.join("\n");

        self.blank_runs
            .replace_all(&joined, "\n\n")
            .trim()
            .to_string()
    }
}

/// Citation block built from evidence tags only, in the reply language.
fn citation_block(tags: &BTreeSet<String>, language: Language) -> String {
    let label = match language {
        Language::Ms => "Sumber",
        Language::En => "Sources",
    };
    let mut block = format!("\n\n{label}:");
    for tag in tags {
        block.push_str(&format!("\n• {tag}"));
    }
    block
}

/// Wraps a [`Synthesizer`] with the prompt/post-processing contract and a
/// hard timeout. Every failure mode is `SynthesisUnavailable`; the
/// orchestrator recovers by moving to the next tier.
pub struct SynthesisAdapter {
    synthesizer: Arc<dyn Synthesizer>,
    params: GenerateParams,
    timeout: Duration,
    postprocessor: Postprocessor,
}

impl SynthesisAdapter {
    pub fn new(synthesizer: Arc<dyn Synthesizer>, params: GenerateParams, timeout: Duration) -> Self {
        Self {
            synthesizer,
            params,
            timeout,
            postprocessor: Postprocessor::new(),
        }
    }

    /// Generate a cited answer from the evidence set.
    pub async fn answer(&self, query: &Query, bundle: &EvidenceBundle) -> Result<Answer> {
        let prompt = build_prompt(query, bundle);
        tracing::debug!(
            "Synthesizing via {} ({} evidence items, {:?} confidence)",
            self.synthesizer.name(),
            bundle.items.len(),
            bundle.confidence
        );

        let generated = tokio::time::timeout(
            self.timeout,
            self.synthesizer.generate(&prompt, &self.params),
        )
        .await
        .map_err(|_| {
            TanyaError::SynthesisUnavailable(format!(
                "{} timed out after {}s",
                self.synthesizer.name(),
                self.timeout.as_secs()
            ))
        })??;

        let text = self.postprocessor.clean(&generated);
        if text.is_empty() {
            return Err(TanyaError::SynthesisUnavailable(
                "service returned empty text".into(),
            ));
        }

        if detect_language(&text) != query.language {
            tracing::warn!(
                "Reply language does not match query language ({})",
                query.language.label()
            );
        }

        let sources = bundle.source_tags();
        let text = format!("{}{}", text, citation_block(&sources, query.language));
        Ok(Answer::new(text, sources, AnswerTier::Synthesized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tanya_core::types::{Confidence, EvidenceItem, LanguageHint};

    struct CannedSynthesizer {
        reply: &'static str,
    }

    #[async_trait]
    impl Synthesizer for CannedSynthesizer {
        fn name(&self) -> &str {
            "canned"
        }
        async fn generate(&self, _prompt: &str, _params: &GenerateParams) -> Result<String> {
            Ok(self.reply.to_string())
        }
    }

    struct SlowSynthesizer;

    #[async_trait]
    impl Synthesizer for SlowSynthesizer {
        fn name(&self) -> &str {
            "slow"
        }
        async fn generate(&self, _prompt: &str, _params: &GenerateParams) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(String::new())
        }
    }

    fn bundle() -> EvidenceBundle {
        EvidenceBundle {
            items: vec![EvidenceItem {
                question: "Kos gantian IC".into(),
                answer: "RM10 selepas 1 tahun".into(),
                source_tag: "JPN".into(),
                score: 9.0,
            }],
            confidence: Confidence::High,
        }
    }

    fn query() -> Query {
        Query::new("Berapa bayaran IC rosak", LanguageHint::Auto)
    }

    #[test]
    fn test_prompt_contains_evidence_and_language() {
        let prompt = build_prompt(&query(), &bundle());
        assert!(prompt.contains("RM10 selepas 1 tahun"));
        assert!(prompt.contains("FAQ 1 (JPN)"));
        assert!(prompt.contains("Bahasa Melayu"));
        assert!(prompt.contains("Berapa bayaran IC rosak"));
    }

    #[test]
    fn test_clean_strips_markdown() {
        let pp = Postprocessor::new();
        let cleaned = pp.clean("## Tajuk\n**Bayaran** ialah `RM10`.\n- pertama\n* kedua\n```\nkod\n```\n");
        assert!(!cleaned.contains("**"));
        assert!(!cleaned.contains('#'));
        assert!(!cleaned.contains('`'));
        assert!(cleaned.contains("• pertama"));
        assert!(cleaned.contains("Bayaran ialah RM10."));
        assert!(!cleaned.contains("kod"));
    }

    #[test]
    fn test_clean_drops_model_source_claims() {
        let pp = Postprocessor::new();
        let cleaned = pp.clean("Bayaran ialah RM10.\n\nSumber: laman web rasmi\n📚 Sources:\nJPN");
        assert!(cleaned.contains("RM10"));
        assert!(!cleaned.to_lowercase().contains("sumber"));
        assert!(!cleaned.to_lowercase().contains("sources"));
    }

    #[test]
    fn test_citation_block_language() {
        let tags: BTreeSet<String> = ["JPN".to_string(), "APMM".to_string()].into();
        let ms = citation_block(&tags, Language::Ms);
        assert!(ms.contains("Sumber:"));
        assert!(ms.contains("• APMM"));
        assert!(ms.contains("• JPN"));
        assert!(citation_block(&tags, Language::En).contains("Sources:"));
    }

    #[tokio::test]
    async fn test_answer_appends_bundle_citations() {
        let adapter = SynthesisAdapter::new(
            Arc::new(CannedSynthesizer {
                reply: "Bayaran penggantian ialah RM10 selepas satu tahun.\n\nSumber: ciptaan model",
            }),
            GenerateParams::default(),
            Duration::from_secs(5),
        );
        let answer = adapter.answer(&query(), &bundle()).await.unwrap();
        assert_eq!(answer.tier, AnswerTier::Synthesized);
        assert!(answer.text.contains("RM10"));
        assert!(answer.text.contains("Sumber:\n• JPN"));
        assert!(!answer.text.contains("ciptaan model"));
        assert!(answer.sources.contains("JPN"));
        assert_eq!(answer.sources.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_generation_is_unavailable() {
        let adapter = SynthesisAdapter::new(
            Arc::new(CannedSynthesizer { reply: "   \n" }),
            GenerateParams::default(),
            Duration::from_secs(5),
        );
        let err = adapter.answer(&query(), &bundle()).await.unwrap_err();
        assert!(matches!(err, TanyaError::SynthesisUnavailable(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let adapter = SynthesisAdapter::new(
            Arc::new(SlowSynthesizer),
            GenerateParams::default(),
            Duration::from_millis(50),
        );
        let err = adapter.answer(&query(), &bundle()).await.unwrap_err();
        assert!(matches!(err, TanyaError::SynthesisUnavailable(_)));
    }
}
