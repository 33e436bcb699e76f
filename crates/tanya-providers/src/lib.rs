//! # Tanya Providers
//!
//! Clients for the external text-generation service behind the
//! `Synthesizer` trait. One unified OpenAI-compatible client covers
//! vLLM, Ollama's /v1 endpoint and hosted APIs; a native Ollama client
//! covers servers without the compatibility layer. The default "auto"
//! provider chains both behind a failover wrapper.

pub mod failover;
pub mod ollama;
pub mod openai_compatible;

use std::sync::Arc;

use tanya_core::config::TanyaConfig;
use tanya_core::error::{Result, TanyaError};
use tanya_core::traits::Synthesizer;

/// Create a synthesizer from configuration.
pub fn create_synthesizer(config: &TanyaConfig) -> Result<Arc<dyn Synthesizer>> {
    let llm = &config.llm;
    match llm.provider.as_str() {
        "openai-compatible" => Ok(Arc::new(
            openai_compatible::OpenAiCompatibleSynthesizer::new(&llm.endpoint, &llm.api_key),
        )),
        "ollama" => Ok(Arc::new(ollama::OllamaSynthesizer::new(&llm.endpoint))),
        // Try the OpenAI-compatible surface first, fall back to the native
        // Ollama API on the same host.
        "auto" => Ok(Arc::new(failover::FailoverSynthesizer::new(vec![
            Box::new(openai_compatible::OpenAiCompatibleSynthesizer::new(
                &llm.endpoint,
                &llm.api_key,
            )),
            Box::new(ollama::OllamaSynthesizer::new(&llm.endpoint)),
        ]))),
        other => Err(TanyaError::Config(format!(
            "Unknown llm provider '{other}' (expected auto, openai-compatible or ollama)"
        ))),
    }
}
