use serde::{Deserialize, Serialize};
use validator::Validate;

pub const MISTRAL_BASE_URL: &str = "https://api.mistral.ai/v1";
pub const DEFAULT_MODEL: &str = "ministral-8b-latest";

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct LLMConfig {
    #[validate(url)]
    pub base_url: String,
    #[validate(length(min = 1))]
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LLMConfig {
    pub fn with_model(&self, model: Option<&str>) -> Self {
        let mut config = self.clone();
        if let Some(model) = model {
            config.model = model.to_string();
        }
        config
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: MISTRAL_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            max_tokens: None,
            temperature: None,
        }
    }
}
