use crate::domain::conversation::Conversation;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One line of the fine-tuning dataset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineTuningLine {
    pub prompt: String,
    pub prompt_id: String,
    pub messages: Conversation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingFile {
    pub file_id: String,
    pub weight: f64,
}

impl TrainingFile {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            weight: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FineTuningHyperparameters {
    #[validate(range(min = 1))]
    pub training_steps: u32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub learning_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineTuningJobRequest {
    pub model: String,
    pub training_files: Vec<TrainingFile>,
    pub validation_files: Vec<String>,
    pub hyperparameters: FineTuningHyperparameters,
    pub invalid_sample_skip_percentage: f64,
    pub auto_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineTuningJob {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub fine_tuned_model: Option<String>,
}

/// Remote file reference returned after an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilePurpose {
    FineTune,
    Batch,
}

impl FilePurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilePurpose::FineTune => "fine-tune",
            FilePurpose::Batch => "batch",
        }
    }
}
