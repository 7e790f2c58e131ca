use super::conversation_builder::format_inference_lines;
use super::reconcile::reconcile_file;
use crate::domain::batch_job::{BatchJob, BatchJobHandle, BatchJobStatus};
use crate::domain::conversation::Conversation;
use crate::domain::error::{AppError, Result};
use crate::domain::fine_tuning::FilePurpose;
use crate::domain::llm_config::LLMConfig;
use crate::infrastructure::artifact_store::{store_artifact, write_manifest, ArtifactLayout};
use crate::infrastructure::jsonl::to_jsonl;
use crate::infrastructure::llm_clients::BatchJobService;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Time source for the poll loop. `now` must advance across `sleep`.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);

    fn now(&self) -> Instant;
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` polls until the job is terminal.
    pub max_wait: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_wait: None,
        }
    }
}

/// Submit -> poll -> download -> reconcile for one batch of conversations.
pub struct BatchInferenceUseCase {
    service: Arc<dyn BatchJobService>,
    sleeper: Arc<dyn Sleeper>,
    layout: ArtifactLayout,
    policy: PollPolicy,
    endpoint: String,
}

impl BatchInferenceUseCase {
    pub fn new(
        service: Arc<dyn BatchJobService>,
        layout: ArtifactLayout,
        policy: PollPolicy,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            service,
            sleeper: Arc::new(TokioSleeper),
            layout,
            policy,
            endpoint: endpoint.into(),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub async fn run(
        &self,
        config: &LLMConfig,
        conversations: &[Conversation],
    ) -> Result<Vec<Vec<String>>> {
        if conversations.is_empty() {
            return Ok(Vec::new());
        }
        let handle = self.submit(config, conversations).await?;
        let results_path = self.await_completion(config, &handle).await?;
        self.reconcile(&results_path, handle.request_count)
    }

    /// Writes the request file, uploads it and creates the job.
    pub async fn submit(
        &self,
        config: &LLMConfig,
        conversations: &[Conversation],
    ) -> Result<BatchJobHandle> {
        self.layout.ensure()?;
        let lines = format_inference_lines(conversations);
        let payload = to_jsonl(&lines)?.into_bytes();

        let input_path = self.layout.batch_input_path();
        let mut manifest = store_artifact(&input_path, &payload, None)?;
        info!(path = %input_path.display(), requests = lines.len(), "Wrote batch request file");

        let file_name = input_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "batch_input.jsonl".to_string());
        let uploaded = self
            .service
            .upload_file(config, &file_name, payload, FilePurpose::Batch)
            .await?;
        manifest.remote_id = Some(uploaded.id.clone());
        write_manifest(&input_path, &manifest)?;
        info!(file_id = %uploaded.id, "Uploaded batch request file");

        let metadata = serde_json::json!({ "job_type": "testing" });
        let job = self
            .service
            .create_batch_job(config, &[uploaded.id.clone()], &self.endpoint, &metadata)
            .await?;
        info!(job_id = %job.id, model = %config.model, "Created batch job");

        Ok(BatchJobHandle {
            job_id: job.id,
            input_file_id: uploaded.id,
            request_count: conversations.len(),
        })
    }

    /// Polls until the job is terminal, then downloads the output file.
    pub async fn await_completion(
        &self,
        config: &LLMConfig,
        handle: &BatchJobHandle,
    ) -> Result<PathBuf> {
        let job = self.poll_until_terminal(config, handle).await?;

        if job.status != BatchJobStatus::Success {
            return Err(AppError::JobFailed(job.error_summary()));
        }
        let output_file = job.output_file.clone().ok_or_else(|| {
            AppError::JobFailed(format!("job {} succeeded without an output file", job.id))
        })?;

        let bytes = self.service.download_file(config, &output_file).await?;
        let results_path = self.layout.batch_results_path();
        store_artifact(&results_path, &bytes, Some(&output_file))?;
        info!(
            path = %results_path.display(),
            file_id = %output_file,
            bytes = bytes.len(),
            "Downloaded batch results"
        );
        Ok(results_path)
    }

    async fn poll_until_terminal(
        &self,
        config: &LLMConfig,
        handle: &BatchJobHandle,
    ) -> Result<BatchJob> {
        let started = self.sleeper.now();
        loop {
            let job = self.service.get_batch_job(config, &handle.job_id).await?;
            info!(
                job_id = %job.id,
                status = %job.status,
                completed = job.completed_requests.unwrap_or(0),
                total = job.total_requests.unwrap_or(handle.request_count as u64),
                "Awaiting batch job completion"
            );
            if job.status.is_terminal() {
                return Ok(job);
            }

            let elapsed = self.sleeper.now().saturating_duration_since(started);
            let pause = match self.policy.max_wait {
                Some(max_wait) if elapsed >= max_wait => {
                    return Err(AppError::JobTimeout(format!(
                        "job {} still {} after {}s (limit {}s)",
                        job.id,
                        job.status,
                        elapsed.as_secs(),
                        max_wait.as_secs()
                    )));
                }
                // Never sleep past the deadline; the final poll lands on it.
                Some(max_wait) => self.policy.interval.min(max_wait - elapsed),
                None => self.policy.interval,
            };
            self.sleeper.sleep(pause).await;
        }
    }

    pub fn reconcile(&self, results_path: &Path, n_queries: usize) -> Result<Vec<Vec<String>>> {
        reconcile_file(results_path, n_queries)
    }
}
