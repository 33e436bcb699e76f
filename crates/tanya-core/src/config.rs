//! Tanya configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TanyaError};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TanyaConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
}

impl TanyaConfig {
    /// Load config from the default path (~/.tanya/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TanyaError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| TanyaError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| TanyaError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tanya")
            .join("config.toml")
    }
}

/// External text-generation service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "auto" (OpenAI-compatible with native-Ollama fallback),
    /// "openai-compatible", or "ollama".
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Service root, e.g. "http://localhost:11434". The provider appends
    /// its own API path.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "auto".into()
}
fn default_endpoint() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "qwen3-14b".into()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_tokens() -> u32 {
    800
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: String::new(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Knowledge-base document location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default = "default_faq_path")]
    pub faq_path: String,
}

fn default_faq_path() -> String {
    "faq.txt".into()
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            faq_path: default_faq_path(),
        }
    }
}

/// Messaging front-end configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "bool_true")]
    pub enabled: bool,
    /// Seconds to sleep between failed polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

fn bool_true() -> bool {
    true
}
fn default_poll_interval() -> u64 {
    1
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            enabled: bool_true(),
            poll_interval: default_poll_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TanyaConfig::default();
        assert_eq!(config.llm.provider, "auto");
        assert_eq!(config.llm.timeout_secs, 30);
        assert_eq!(config.knowledge.faq_path, "faq.txt");
        assert!(config.channel.telegram.enabled);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TanyaConfig = toml::from_str(
            r#"
            [llm]
            endpoint = "http://gpu-box:8000"
            model = "llama3"
            "#,
        )
        .unwrap();
        assert_eq!(config.llm.endpoint, "http://gpu-box:8000");
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.llm.provider, "auto");
        assert_eq!(config.llm.max_tokens, 800);
        assert_eq!(config.knowledge.faq_path, "faq.txt");
    }

    #[test]
    fn test_roundtrip() {
        let mut config = TanyaConfig::default();
        config.channel.telegram.bot_token = "123:abc".into();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: TanyaConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.channel.telegram.bot_token, "123:abc");
        assert_eq!(parsed.llm.model, config.llm.model);
    }
}
