//! Unified OpenAI-compatible synthesizer.
//!
//! One struct covers every chat-completions server (vLLM, Ollama /v1,
//! hosted APIs); they differ only in endpoint and API key. Every
//! failure mode maps to `SynthesisUnavailable`; the pipeline treats the
//! service as best-effort.

use async_trait::async_trait;
use serde_json::{json, Value};
use tanya_core::error::{Result, TanyaError};
use tanya_core::traits::{GenerateParams, Synthesizer};

pub struct OpenAiCompatibleSynthesizer {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleSynthesizer {
    /// `endpoint` is the service root (e.g. "http://localhost:11434");
    /// the chat-completions path is appended here.
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        Self {
            base_url: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Synthesizer for OpenAiCompatibleSynthesizer {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn generate(&self, prompt: &str, params: &GenerateParams) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = json!({
            "model": params.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        });

        let mut req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);
        if !self.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let resp = req.send().await.map_err(|e| {
            TanyaError::SynthesisUnavailable(format!("connection to {url} failed: {e}"))
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(TanyaError::SynthesisUnavailable(format!(
                "API error {status}: {text}"
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| TanyaError::SynthesisUnavailable(format!("invalid response: {e}")))?;

        let content = json["choices"]
            .get(0)
            .and_then(|c| c["message"]["content"].as_str())
            .unwrap_or("")
            .to_string();

        if content.trim().is_empty() {
            return Err(TanyaError::SynthesisUnavailable(
                "no content in response".into(),
            ));
        }
        Ok(content)
    }
}
