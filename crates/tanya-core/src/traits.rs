//! The seam between the answer pipeline and the external
//! text-generation service.

use async_trait::async_trait;

use crate::error::Result;

/// Sampling parameters passed through to the service.
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            model: "qwen3-14b".into(),
            temperature: 0.3,
            max_tokens: 800,
        }
    }
}

/// A stateless prompt → text transformation service.
///
/// Implementations must never assume success: any transport failure,
/// non-2xx status or empty generation surfaces as
/// `TanyaError::SynthesisUnavailable`.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, params: &GenerateParams) -> Result<String>;
}
