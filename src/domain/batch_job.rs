use crate::domain::conversation::Conversation;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Status vocabulary reported by the remote batch service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchJobStatus {
    Queued,
    Running,
    Success,
    Failed,
    TimeoutExceeded,
    CancellationRequested,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl BatchJobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchJobStatus::Success
                | BatchJobStatus::Failed
                | BatchJobStatus::TimeoutExceeded
                | BatchJobStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BatchJobStatus::Queued => "QUEUED",
            BatchJobStatus::Running => "RUNNING",
            BatchJobStatus::Success => "SUCCESS",
            BatchJobStatus::Failed => "FAILED",
            BatchJobStatus::TimeoutExceeded => "TIMEOUT_EXCEEDED",
            BatchJobStatus::CancellationRequested => "CANCELLATION_REQUESTED",
            BatchJobStatus::Cancelled => "CANCELLED",
            BatchJobStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for BatchJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a remote batch job as returned by create/get.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchJob {
    pub id: String,
    pub status: BatchJobStatus,
    #[serde(default)]
    pub output_file: Option<String>,
    #[serde(default)]
    pub error_file: Option<String>,
    #[serde(default)]
    pub errors: Option<Vec<JsonValue>>,
    #[serde(default)]
    pub total_requests: Option<u64>,
    #[serde(default)]
    pub completed_requests: Option<u64>,
    #[serde(default)]
    pub failed_requests: Option<u64>,
}

impl BatchJob {
    pub fn error_summary(&self) -> String {
        let errors = self.errors.as_deref().unwrap_or_default();
        if errors.is_empty() {
            return format!("job {} ended with status {}", self.id, self.status);
        }
        let details = errors
            .iter()
            .map(|err| {
                err.get("message")
                    .and_then(|m| m.as_str())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.to_string())
            })
            .collect::<Vec<_>>()
            .join("; ");
        format!("job {} ended with status {}: {}", self.id, self.status, details)
    }
}

/// What `submit` hands back: enough to poll and to size reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJobHandle {
    pub job_id: String,
    pub input_file_id: String,
    pub request_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<JsonValue>,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            kind: "json_object".to_string(),
            json_schema: None,
        }
    }

    /// Strict schema for `{"highlighted": [string, ...]}`.
    pub fn highlights_schema() -> Self {
        Self {
            kind: "json_schema".to_string(),
            json_schema: Some(serde_json::json!({
                "name": "Highlights",
                "strict": true,
                "schema": {
                    "title": "Highlights",
                    "type": "object",
                    "properties": {
                        "highlighted": {
                            "title": "Highlighted",
                            "type": "array",
                            "items": { "type": "string" }
                        }
                    },
                    "required": ["highlighted"],
                    "additionalProperties": false
                }
            })),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequestBody {
    pub messages: Conversation,
    pub response_format: ResponseFormat,
}

/// One line of the batch request file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchJobRecord {
    pub custom_id: String,
    pub body: BatchRequestBody,
}

/// One decoded line of the batch result file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResultRecord {
    pub custom_id: usize,
    pub raw_content: Option<String>,
}

/// A single model answer after decoding, before it is flattened to strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prediction {
    Empty,
    List(Vec<String>),
    /// A `highlighted` string that was not a list literal; kept verbatim.
    RawString(String),
}

impl Prediction {
    pub fn into_answers(self) -> Vec<String> {
        match self {
            Prediction::Empty => Vec::new(),
            Prediction::List(items) => items,
            Prediction::RawString(raw) => vec![raw],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_decoding() {
        let status: BatchJobStatus = serde_json::from_str("\"TIMEOUT_EXCEEDED\"").unwrap();
        assert_eq!(status, BatchJobStatus::TimeoutExceeded);
        assert!(status.is_terminal());

        let unknown: BatchJobStatus = serde_json::from_str("\"PAUSED\"").unwrap();
        assert_eq!(unknown, BatchJobStatus::Unknown);
        assert!(!unknown.is_terminal());
        assert!(!BatchJobStatus::CancellationRequested.is_terminal());
    }

    #[test]
    fn test_job_error_summary() {
        let job: BatchJob = serde_json::from_value(serde_json::json!({
            "id": "job-1",
            "status": "FAILED",
            "errors": [{"message": "quota exceeded", "count": 1}]
        }))
        .unwrap();

        assert_eq!(
            job.error_summary(),
            "job job-1 ended with status FAILED: quota exceeded"
        );
    }

    #[test]
    fn test_prediction_into_answers() {
        assert!(Prediction::Empty.into_answers().is_empty());
        assert_eq!(
            Prediction::List(vec!["a".to_string()]).into_answers(),
            vec!["a".to_string()]
        );
        assert_eq!(
            Prediction::RawString("a, b".to_string()).into_answers(),
            vec!["a, b".to_string()]
        );
    }
}
