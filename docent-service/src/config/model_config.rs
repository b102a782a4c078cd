//! Gemini model and prompting configuration.

use serde::Deserialize;
use std::time::Duration;

/// Gemini API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key. Falls back to `GOOGLE_API_KEY` when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Threshold applied to every harm category, e.g. `BLOCK_ONLY_HIGH`
    #[serde(default = "default_safety_threshold")]
    pub safety_threshold: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl GeminiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            safety_threshold: default_safety_threshold(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Prompt fan-out configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PromptingConfig {
    /// Maximum PDF pages sent to the model at once. 1 keeps requests strictly
    /// sequential. Responses are always returned in page order.
    #[serde(default = "default_page_concurrency")]
    pub page_concurrency: usize,
}

impl Default for PromptingConfig {
    fn default() -> Self {
        Self {
            page_concurrency: default_page_concurrency(),
        }
    }
}

// ==================== Default Value Functions ====================

pub(crate) fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

pub(crate) fn default_model() -> String {
    "gemini-1.5-pro".to_string()
}

pub(crate) fn default_temperature() -> f32 {
    0.2
}

pub(crate) fn default_top_p() -> f32 {
    1.0
}

pub(crate) fn default_top_k() -> u32 {
    32
}

pub(crate) fn default_max_output_tokens() -> u32 {
    4096
}

pub(crate) fn default_safety_threshold() -> String {
    "BLOCK_MEDIUM_AND_ABOVE".to_string()
}

pub(crate) fn default_request_timeout_secs() -> u64 {
    120
}

pub(crate) fn default_page_concurrency() -> usize {
    1
}
