//! Native Ollama synthesizer (`/api/generate`), for servers without the
//! OpenAI compatibility layer.

use async_trait::async_trait;
use serde_json::{json, Value};
use tanya_core::error::{Result, TanyaError};
use tanya_core::traits::{GenerateParams, Synthesizer};

pub struct OllamaSynthesizer {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaSynthesizer {
    pub fn new(endpoint: &str) -> Self {
        Self {
            base_url: endpoint.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Synthesizer for OllamaSynthesizer {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &str, params: &GenerateParams) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let body = json!({
            "model": params.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": params.temperature,
                "num_predict": params.max_tokens,
            },
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                TanyaError::SynthesisUnavailable(format!("connection to {url} failed: {e}"))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(TanyaError::SynthesisUnavailable(format!(
                "Ollama error {status}: {text}"
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| TanyaError::SynthesisUnavailable(format!("invalid response: {e}")))?;

        let content = json["response"].as_str().unwrap_or("").to_string();
        if content.trim().is_empty() {
            return Err(TanyaError::SynthesisUnavailable(
                "model returned no response".into(),
            ));
        }
        Ok(content)
    }
}
