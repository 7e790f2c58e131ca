use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Internal(String),
    NotFound(String),
    ValidationError(String),
    ParseError(String),
    ConfigError(String),
    LLMError(String),
    SecurityError(String),
    IoError(String),
    /// Scoring input where predictions and labels disagree in length (or are empty).
    LengthMismatch { predictions: usize, labels: usize },
    /// The remote batch job reached a non-successful terminal state.
    JobFailed(String),
    /// The poll loop gave up before the job reached a terminal state.
    JobTimeout(String),
    /// A single result record could not be decoded. Recovered locally.
    MalformedResult(String),
    /// A predicted list contained a non-string element.
    SchemaViolation(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AppError::LLMError(msg) => write!(f, "LLM error: {}", msg),
            AppError::SecurityError(msg) => write!(f, "Security error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
            AppError::LengthMismatch {
                predictions,
                labels,
            } => write!(
                f,
                "Length mismatch: {} predictions vs {} labels (both must be equal and non-zero)",
                predictions, labels
            ),
            AppError::JobFailed(msg) => write!(f, "Batch job failed: {}", msg),
            AppError::JobTimeout(msg) => write!(f, "Batch job timed out: {}", msg),
            AppError::MalformedResult(msg) => write!(f, "Malformed result: {}", msg),
            AppError::SchemaViolation(msg) => write!(f, "Schema violation: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ParseError(err.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
