mod prompting;

pub use prompting::{PageResponse, PromptOutcome, Prompts};

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::DocentConfig;
use crate::error::ServiceResult;
use crate::gemini::GeminiClient;

/// Main service coordinator
pub struct DocentService {
    pub config: Arc<DocentConfig>,
    pub gemini: Arc<GeminiClient>,
}

impl DocentService {
    /// Create a new service instance
    pub async fn new(config: Arc<DocentConfig>) -> ServiceResult<Self> {
        info!("Initializing Docent service");

        let gemini = Arc::new(GeminiClient::new(config.gemini.clone())?);

        if !gemini.has_api_key() {
            warn!("No Gemini API key configured; uploads will fail until one is set");
        } else if gemini.model_available().await {
            info!(model = %gemini.model(), "Gemini model is available");
        } else {
            warn!(model = %gemini.model(), "Gemini model is not available");
        }

        Ok(Self { config, gemini })
    }
}
