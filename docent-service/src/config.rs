//! Service configuration.
//!
//! Settings are layered: built-in defaults, then an optional `config.*` file in
//! the working directory, then `DOCENT__*` environment variables. The Gemini API
//! key also falls back to `GOOGLE_API_KEY`.

mod loader;
mod model_config;
mod static_config;

use serde::Deserialize;

pub use model_config::GeminiConfig;
use model_config::PromptingConfig;
use static_config::{PdfConfig, ServerConfig, StorageConfig};

use crate::error::ServiceResult;

/// Complete service configuration, loaded once at startup
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocentConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub pdf: PdfConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub prompting: PromptingConfig,
}

impl DocentConfig {
    /// Load configuration from `config.*` and the process environment
    pub fn load() -> ServiceResult<Self> {
        loader::load_config()
    }
}
