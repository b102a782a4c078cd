//! Configuration loading from files and environment variables.

use config::{Config, Environment, File, Source};

use crate::error::{ServiceError, ServiceResult};

use super::DocentConfig;

/// Prefix for environment overrides, e.g. `DOCENT__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "DOCENT";

/// Variable consulted when no API key is configured under `gemini.api_key`
pub const API_KEY_FALLBACK_VAR: &str = "GOOGLE_API_KEY";

/// Load configuration from `config.*` (optional) and the process environment
pub fn load_config() -> ServiceResult<DocentConfig> {
    let config = build_config(
        File::with_name("config").required(false),
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    )?;

    Ok(with_api_key_fallback(
        config,
        std::env::var(API_KEY_FALLBACK_VAR).ok(),
    ))
}

fn build_config(
    file: impl Source + Send + Sync + 'static,
    environment: Environment,
) -> ServiceResult<DocentConfig> {
    Config::builder()
        .add_source(file)
        .add_source(environment)
        .build()
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to build config: {}", e),
        })?
        .try_deserialize()
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to deserialize config: {}", e),
        })
}

/// Blank keys count as unset
fn with_api_key_fallback(mut config: DocentConfig, fallback: Option<String>) -> DocentConfig {
    let configured = config
        .gemini
        .api_key
        .take()
        .filter(|key| !key.trim().is_empty());

    config.gemini.api_key =
        configured.or_else(|| fallback.filter(|key| !key.trim().is_empty()));
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{FileFormat, Map};
    use std::path::PathBuf;

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let mut source = Map::new();
        for (key, value) in vars {
            source.insert(key.to_string(), value.to_string());
        }
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .source(Some(source))
    }

    fn empty_file() -> impl Source + Send + Sync + 'static {
        File::from_str("", FileFormat::Toml)
    }

    #[test]
    fn test_defaults() {
        let config = build_config(empty_file(), environment(&[])).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.storage.upload_dir, PathBuf::from("./uploads"));
        assert!(config.pdf.pdfium_dir.is_none());
        assert_eq!(config.gemini.model, "gemini-1.5-pro");
        assert_eq!(config.gemini.temperature, 0.2);
        assert_eq!(config.gemini.top_p, 1.0);
        assert_eq!(config.gemini.top_k, 32);
        assert_eq!(config.gemini.max_output_tokens, 4096);
        assert_eq!(config.gemini.safety_threshold, "BLOCK_MEDIUM_AND_ABOVE");
        assert!(config.gemini.api_key.is_none());
        assert_eq!(config.prompting.page_concurrency, 1);
    }

    #[test]
    fn test_file_values() {
        let file = File::from_str(
            r#"
[server]
port = 8081

[storage]
upload_dir = "/srv/docent/uploads"

[gemini]
api_key = "from-file"
temperature = 0.7
"#,
            FileFormat::Toml,
        );

        let config = build_config(file, environment(&[])).unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(
            config.storage.upload_dir,
            PathBuf::from("/srv/docent/uploads")
        );
        assert_eq!(config.gemini.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.gemini.temperature, 0.7);
        // Untouched fields keep their defaults
        assert_eq!(config.gemini.top_k, 32);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = File::from_str("[server]\nport = 8081\n", FileFormat::Toml);
        let env = environment(&[
            ("DOCENT__SERVER__PORT", "9000"),
            ("DOCENT__GEMINI__MODEL", "gemini-2.0-flash"),
            ("DOCENT__PROMPTING__PAGE_CONCURRENCY", "4"),
        ]);

        let config = build_config(file, env).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.prompting.page_concurrency, 4);
    }

    #[test]
    fn test_invalid_value_is_config_error() {
        let file = File::from_str("[server]\nport = \"not a port\"\n", FileFormat::Toml);

        let result = build_config(file, environment(&[]));

        assert!(matches!(result, Err(ServiceError::Config { .. })));
    }

    #[test]
    fn test_api_key_fallback() {
        let config = with_api_key_fallback(DocentConfig::default(), Some("env-key".to_string()));
        assert_eq!(config.gemini.api_key.as_deref(), Some("env-key"));

        let mut configured = DocentConfig::default();
        configured.gemini.api_key = Some("configured".to_string());
        let config = with_api_key_fallback(configured, Some("env-key".to_string()));
        assert_eq!(config.gemini.api_key.as_deref(), Some("configured"));

        let mut blank = DocentConfig::default();
        blank.gemini.api_key = Some("  ".to_string());
        let config = with_api_key_fallback(blank, None);
        assert!(config.gemini.api_key.is_none());
    }
}
