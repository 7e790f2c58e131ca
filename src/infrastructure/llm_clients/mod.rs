pub mod mistral;

use crate::domain::batch_job::{BatchJob, ResponseFormat};
use crate::domain::conversation::Conversation;
use crate::domain::error::Result;
use crate::domain::fine_tuning::{FilePurpose, FineTuningJob, FineTuningJobRequest, UploadedFile};
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

pub use mistral::MistralClient;

/// Synchronous chat completion, one conversation per call.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        config: &LLMConfig,
        messages: &Conversation,
        response_format: &ResponseFormat,
    ) -> Result<String>;
}

#[async_trait]
pub trait FileStore: Send + Sync {
    async fn upload_file(
        &self,
        config: &LLMConfig,
        file_name: &str,
        bytes: Vec<u8>,
        purpose: FilePurpose,
    ) -> Result<UploadedFile>;

    async fn download_file(&self, config: &LLMConfig, file_id: &str) -> Result<Vec<u8>>;
}

/// Remote asynchronous batch jobs. `config.model` selects the model.
#[async_trait]
pub trait BatchJobService: FileStore {
    async fn create_batch_job(
        &self,
        config: &LLMConfig,
        input_files: &[String],
        endpoint: &str,
        metadata: &JsonValue,
    ) -> Result<BatchJob>;

    async fn get_batch_job(&self, config: &LLMConfig, job_id: &str) -> Result<BatchJob>;
}

#[async_trait]
pub trait FineTuningService: FileStore {
    async fn create_fine_tuning_job(
        &self,
        config: &LLMConfig,
        request: &FineTuningJobRequest,
    ) -> Result<FineTuningJob>;
}
