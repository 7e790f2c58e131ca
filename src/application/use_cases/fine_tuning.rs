use super::conversation_builder::{format_fine_tuning_lines, ConversationBuilder};
use crate::domain::error::{AppError, Result};
use crate::domain::fine_tuning::{
    FilePurpose, FineTuningHyperparameters, FineTuningJob, FineTuningJobRequest, TrainingFile,
    UploadedFile,
};
use crate::domain::llm_config::LLMConfig;
use crate::domain::qa_example::QaExample;
use crate::infrastructure::artifact_store::store_artifact;
use crate::infrastructure::jsonl::to_jsonl;
use crate::infrastructure::llm_clients::FineTuningService;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

const INVALID_SAMPLE_SKIP_PERCENTAGE: f64 = 0.1;

/// Writes the training conversations (with gold answers) as JSONL.
/// Returns the number of lines written.
pub fn dump_fine_tuning_dataset(
    builder: &ConversationBuilder,
    examples: &[QaExample],
    path: &Path,
) -> Result<usize> {
    info!(path = %path.display(), "Generating fine-tuning dataset");
    let conversations: Vec<_> = examples
        .iter()
        .map(|example| builder.build_for_training(example))
        .collect();
    let lines = format_fine_tuning_lines(&conversations);
    let payload = to_jsonl(&lines)?;
    store_artifact(path, payload.as_bytes(), None)?;
    info!(path = %path.display(), lines = lines.len(), "Fine-tuning dataset saved");
    Ok(lines.len())
}

pub struct FineTuningUseCase {
    service: Arc<dyn FineTuningService>,
}

impl FineTuningUseCase {
    pub fn new(service: Arc<dyn FineTuningService>) -> Self {
        Self { service }
    }

    pub async fn upload_dataset(&self, config: &LLMConfig, path: &Path) -> Result<UploadedFile> {
        let bytes = fs::read(path).map_err(|e| {
            AppError::IoError(format!("Failed to read dataset {}: {}", path.display(), e))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                AppError::ValidationError(format!("Not a file path: {}", path.display()))
            })?;

        info!(path = %path.display(), "Uploading dataset");
        let uploaded = self
            .service
            .upload_file(config, &file_name, bytes, FilePurpose::FineTune)
            .await?;
        info!(file_id = %uploaded.id, "Dataset uploaded");
        Ok(uploaded)
    }

    /// Creates a job that waits for a manual start.
    pub async fn create_fine_tuning_job(
        &self,
        config: &LLMConfig,
        training_file_ids: &[String],
        validation_file_ids: &[String],
        hyperparameters: FineTuningHyperparameters,
    ) -> Result<FineTuningJob> {
        if training_file_ids.is_empty() {
            return Err(AppError::ValidationError(
                "At least one training file id is required".to_string(),
            ));
        }
        hyperparameters
            .validate()
            .map_err(|e| AppError::ValidationError(format!("Invalid hyperparameters: {e}")))?;

        let request = FineTuningJobRequest {
            model: config.model.clone(),
            training_files: training_file_ids.iter().map(TrainingFile::new).collect(),
            validation_files: validation_file_ids.to_vec(),
            hyperparameters,
            invalid_sample_skip_percentage: INVALID_SAMPLE_SKIP_PERCENTAGE,
            auto_start: false,
        };

        info!(model = %request.model, "Creating fine-tuning job");
        let job = self.service.create_fine_tuning_job(config, &request).await?;
        info!(job_id = %job.id, "Fine-tuning job created");
        Ok(job)
    }
}
