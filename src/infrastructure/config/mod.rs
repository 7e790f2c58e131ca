use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::infrastructure::security::keyring::SecretStore;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::Validate;

pub const DEFAULT_CONFIG_FILE: &str = "cuad-highlight.toml";
pub const ENV_PREFIX: &str = "CUAD_";
pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";
const API_KEY_SECRET: &str = "mistral";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub llm: LLMConfig,
    pub data_dir: PathBuf,
    pub corpus_path: PathBuf,
    #[validate(range(min = 1))]
    pub contract_character_limit: usize,
    #[validate(range(min = 1))]
    pub poll_interval_secs: u64,
    /// Unset means poll until the job reaches a terminal state.
    #[validate(range(min = 1))]
    pub max_wait_secs: Option<u64>,
    #[validate(length(min = 1))]
    pub batch_endpoint: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LLMConfig::default(),
            data_dir: PathBuf::from("data"),
            corpus_path: PathBuf::from("data/CUAD_v1/CUAD_v1.json"),
            contract_character_limit: 10_000,
            poll_interval_secs: 10,
            max_wait_secs: None,
            batch_endpoint: "/v1/chat/completions".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the TOML file, then `CUAD_*` environment variables
    /// (`CUAD_LLM__MODEL` sets `llm.model`).
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let path = match config_file {
            Some(path) if !path.exists() => {
                return Err(AppError::NotFound(format!(
                    "Config file {} does not exist",
                    path.display()
                )))
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        config
            .validate()
            .map_err(|e| AppError::ConfigError(format!("Invalid configuration: {e}")))?;
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait_secs.map(Duration::from_secs)
    }
}

pub struct ConfigService {
    secrets: SecretStore,
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigService {
    pub fn new() -> Self {
        Self {
            secrets: SecretStore::new("cuad-highlight"),
        }
    }

    pub fn save_api_key(&self, key: &str) -> Result<()> {
        if key.trim().is_empty() {
            return Err(AppError::ValidationError("API key must not be empty".to_string()));
        }
        self.secrets.set_secret(API_KEY_SECRET, key.trim())
    }

    pub fn delete_api_key(&self) -> Result<()> {
        self.secrets.delete_secret(API_KEY_SECRET)
    }

    /// Config value first, then `MISTRAL_API_KEY`, then the OS keyring.
    pub fn resolve_api_key(&self, llm: &LLMConfig) -> Result<String> {
        if let Some(key) = non_empty(llm.api_key.clone()) {
            return Ok(key);
        }
        if let Some(key) = non_empty(std::env::var(API_KEY_ENV).ok()) {
            return Ok(key);
        }
        self.secrets
            .get_secret(API_KEY_SECRET)?
            .and_then(|key| non_empty(Some(key)))
            .ok_or_else(|| {
                AppError::SecurityError(format!(
                    "No API key configured: set {}, {}LLM__API_KEY, or run `cuad-highlight auth set`",
                    API_KEY_ENV, ENV_PREFIX
                ))
            })
    }

    /// Copy of `llm` with the API key filled in.
    pub fn with_api_key(&self, llm: &LLMConfig) -> Result<LLMConfig> {
        let mut resolved = llm.clone();
        resolved.api_key = Some(self.resolve_api_key(llm)?);
        Ok(resolved)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.contract_character_limit, 10_000);
        assert!(config.max_wait().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_merges_file_and_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                    data_dir = "out"
                    poll_interval_secs = 3

                    [llm]
                    model = "ft:ministral-8b-latest:abc"
                "#,
            )?;
            jail.set_env("CUAD_MAX_WAIT_SECS", "600");
            jail.set_env("CUAD_LLM__TEMPERATURE", "0.2");

            let config = AppConfig::load(None).expect("config loads");
            assert_eq!(config.data_dir, PathBuf::from("out"));
            assert_eq!(config.poll_interval_secs, 3);
            assert_eq!(config.max_wait_secs, Some(600));
            assert_eq!(config.llm.model, "ft:ministral-8b-latest:abc");
            assert_eq!(config.llm.temperature, Some(0.2));
            assert_eq!(config.llm.base_url, "https://api.mistral.ai/v1");
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        Jail::expect_with(|jail| {
            jail.create_file(DEFAULT_CONFIG_FILE, "poll_interval_secs = 0")?;
            let err = AppConfig::load(None).unwrap_err();
            assert!(matches!(err, AppError::ConfigError(_)), "{}", err);
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/cuad.toml"))).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_config_api_key_wins() {
        let service = ConfigService::new();
        let llm = LLMConfig {
            api_key: Some("  from-config ".to_string()),
            ..LLMConfig::default()
        };
        assert_eq!(service.resolve_api_key(&llm).unwrap(), "from-config");
        assert_eq!(
            service.with_api_key(&llm).unwrap().api_key.as_deref(),
            Some("from-config")
        );
    }
}
