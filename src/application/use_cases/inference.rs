use super::batch_inference::BatchInferenceUseCase;
use super::conversation_builder::ConversationBuilder;
use super::single_inference::SingleInferenceUseCase;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::qa_example::QaExample;
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InferenceMode {
    #[default]
    Batch,
    Single,
}

impl FromStr for InferenceMode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "batch" => Ok(InferenceMode::Batch),
            "single" => Ok(InferenceMode::Single),
            other => Err(AppError::ValidationError(format!(
                "Unknown inference mode '{}', expected batch or single",
                other
            ))),
        }
    }
}

/// Builds inference conversations and routes them to batch or per-request mode.
pub struct InferenceUseCase {
    builder: ConversationBuilder,
    batch: BatchInferenceUseCase,
    single: SingleInferenceUseCase,
}

impl InferenceUseCase {
    pub fn new(
        builder: ConversationBuilder,
        batch: BatchInferenceUseCase,
        single: SingleInferenceUseCase,
    ) -> Self {
        Self {
            builder,
            batch,
            single,
        }
    }

    /// One prediction per example, in example order.
    pub async fn run_inference(
        &self,
        config: &LLMConfig,
        examples: &[QaExample],
        mode: InferenceMode,
    ) -> Result<Vec<Vec<String>>> {
        let conversations: Vec<_> = examples
            .iter()
            .map(|example| self.builder.build_for_inference(example))
            .collect();
        info!(
            model = %config.model,
            mode = ?mode,
            questions = conversations.len(),
            "Running inference"
        );

        let predictions = match mode {
            InferenceMode::Batch => self.batch.run(config, &conversations).await?,
            InferenceMode::Single => self.single.run(config, &conversations).await?,
        };

        if predictions.len() != examples.len() {
            return Err(AppError::LengthMismatch {
                predictions: predictions.len(),
                labels: examples.len(),
            });
        }
        Ok(predictions)
    }
}
