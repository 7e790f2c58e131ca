use crate::application::use_cases::batch_inference::{BatchInferenceUseCase, PollPolicy};
use crate::application::use_cases::conversation_builder::ConversationBuilder;
use crate::application::use_cases::dataset_extraction::{extract_qa_examples, load_corpus};
use crate::application::{FineTuningUseCase, InferenceUseCase, SingleInferenceUseCase};
use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use crate::domain::qa_example::{DatasetSelection, LabelFilter, QaExample};
use crate::infrastructure::artifact_store::ArtifactLayout;
use crate::infrastructure::config::{AppConfig, ConfigService};
use crate::infrastructure::llm_clients::MistralClient;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Loaded configuration plus the shared remote client, built once per command.
pub struct AppState {
    pub config: AppConfig,
    pub layout: ArtifactLayout,
    config_service: ConfigService,
    client: Arc<MistralClient>,
}

impl AppState {
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let config = AppConfig::load(config_file)?;
        let layout = ArtifactLayout::new(&config.data_dir);
        debug!(
            data_dir = %layout.root().display(),
            model = %config.llm.model,
            "Loaded configuration"
        );
        Ok(Self {
            config,
            layout,
            config_service: ConfigService::new(),
            client: Arc::new(MistralClient::new()),
        })
    }

    /// LLM settings with the model override applied and the API key resolved.
    pub fn llm_config(&self, model: Option<&str>) -> Result<LLMConfig> {
        self.config_service
            .with_api_key(&self.config.llm.with_model(model))
    }

    pub fn extract(
        &self,
        selection: DatasetSelection,
        label_filter: LabelFilter,
    ) -> Result<Vec<QaExample>> {
        let corpus = load_corpus(&self.config.corpus_path)?;
        Ok(extract_qa_examples(
            &corpus,
            selection,
            label_filter,
            self.config.contract_character_limit,
        ))
    }

    pub fn fine_tuning(&self) -> FineTuningUseCase {
        FineTuningUseCase::new(self.client.clone())
    }

    pub fn inference(&self) -> InferenceUseCase {
        let policy = PollPolicy {
            interval: self.config.poll_interval(),
            max_wait: self.config.max_wait(),
        };
        InferenceUseCase::new(
            ConversationBuilder::default(),
            BatchInferenceUseCase::new(
                self.client.clone(),
                self.layout.clone(),
                policy,
                self.config.batch_endpoint.clone(),
            ),
            SingleInferenceUseCase::new(self.client.clone()),
        )
    }
}
