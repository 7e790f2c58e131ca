use super::{BatchJobService, ChatClient, FileStore, FineTuningService};
use crate::domain::batch_job::{BatchJob, ResponseFormat};
use crate::domain::conversation::Conversation;
use crate::domain::error::{AppError, Result};
use crate::domain::fine_tuning::{FilePurpose, FineTuningJob, FineTuningJobRequest, UploadedFile};
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

/// Client for the Mistral files, batch, fine-tuning and chat endpoints.
pub struct MistralClient {
    client: reqwest::Client,
}

impl Default for MistralClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MistralClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(300))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn api_key(config: &LLMConfig) -> Result<String> {
        config
            .api_key
            .clone()
            .ok_or_else(|| AppError::LLMError("Missing API key for Mistral".to_string()))
    }

    fn endpoint(config: &LLMConfig, path: &str) -> String {
        format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Err(AppError::LLMError(format!("API error ({}): {}", status, text)))
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to parse JSON: {}", e)))
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        config: &LLMConfig,
        path: &str,
        body: &JsonValue,
    ) -> Result<T> {
        let api_key = Self::api_key(config)?;
        let url = Self::endpoint(config, path);
        debug!(url = %url, "POST");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::LLMError(format!("Request failed: {}", e)))?;
        Self::decode(response).await
    }

    async fn get(&self, config: &LLMConfig, path: &str) -> Result<reqwest::Response> {
        let api_key = Self::api_key(config)?;
        let url = Self::endpoint(config, path);
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| AppError::LLMError(format!("Request failed: {}", e)))?;
        Self::check(response).await
    }
}

#[async_trait]
impl ChatClient for MistralClient {
    async fn complete(
        &self,
        config: &LLMConfig,
        messages: &Conversation,
        response_format: &ResponseFormat,
    ) -> Result<String> {
        let body = json!({
            "model": config.model,
            "messages": messages,
            "response_format": response_format,
            "max_tokens": config.max_tokens,
            "temperature": config.temperature,
        });

        let json: JsonValue = self.post_json(config, "chat/completions", &body).await?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::LLMError("Invalid response format".to_string()))
    }
}

#[async_trait]
impl FileStore for MistralClient {
    async fn upload_file(
        &self,
        config: &LLMConfig,
        file_name: &str,
        bytes: Vec<u8>,
        purpose: FilePurpose,
    ) -> Result<UploadedFile> {
        let api_key = Self::api_key(config)?;
        let url = Self::endpoint(config, "files");

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/jsonl")
            .map_err(|e| AppError::Internal(format!("Invalid upload mime type: {}", e)))?;
        let form = Form::new()
            .text("purpose", purpose.as_str())
            .part("file", part);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::LLMError(format!("Upload failed: {}", e)))?;
        Self::decode(response).await
    }

    async fn download_file(&self, config: &LLMConfig, file_id: &str) -> Result<Vec<u8>> {
        let response = self
            .get(config, &format!("files/{}/content", file_id))
            .await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::LLMError(format!("Download failed: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl BatchJobService for MistralClient {
    async fn create_batch_job(
        &self,
        config: &LLMConfig,
        input_files: &[String],
        endpoint: &str,
        metadata: &JsonValue,
    ) -> Result<BatchJob> {
        let body = json!({
            "input_files": input_files,
            "model": config.model,
            "endpoint": endpoint,
            "metadata": metadata,
        });
        self.post_json(config, "batch/jobs", &body).await
    }

    async fn get_batch_job(&self, config: &LLMConfig, job_id: &str) -> Result<BatchJob> {
        let response = self.get(config, &format!("batch/jobs/{}", job_id)).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to parse JSON: {}", e)))
    }
}

#[async_trait]
impl FineTuningService for MistralClient {
    async fn create_fine_tuning_job(
        &self,
        config: &LLMConfig,
        request: &FineTuningJobRequest,
    ) -> Result<FineTuningJob> {
        let body = serde_json::to_value(request)?;
        self.post_json(config, "fine_tuning/jobs", &body).await
    }
}
