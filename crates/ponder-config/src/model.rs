//! Model request configuration with defaults.

use serde::{Deserialize, Serialize};

fn default_model() -> String {
    "openai/gpt-oss-120b".to_string()
}

fn default_temperature() -> f32 {
    0.8
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_top_p() -> f32 {
    0.9
}

/// Sampling configuration for model calls.
///
/// Templates may override any field; unspecified fields take the defaults
/// below. No validation beyond type checks happens at this boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier passed through to the provider
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum output tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Nucleus-sampling probability
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ModelConfig::default();
        assert_eq!(config.model, "openai/gpt-oss-120b");
        assert_eq!(config.temperature, 0.8);
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.top_p, 0.9);
    }

    #[test]
    fn partial_json_fills_remaining_defaults() {
        let config: ModelConfig =
            serde_json::from_str(r#"{"model": "llama-3.3-70b", "temperature": 0.2}"#).unwrap();
        assert_eq!(config.model, "llama-3.3-70b");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.top_p, 0.9);
    }
}
