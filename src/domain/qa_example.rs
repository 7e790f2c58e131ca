use crate::domain::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// One question over one contract chunk, with the gold spans found in that chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaExample {
    pub question: String,
    pub context: String,
    pub gold_answers: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetSelection {
    Train,
    Test,
    Validation,
}

impl DatasetSelection {
    /// Contract index range `[start, end)` covered by the split.
    ///
    /// Validation is a prefix of the test range.
    pub fn contract_range(&self) -> Range<usize> {
        match self {
            DatasetSelection::Train => 0..400,
            DatasetSelection::Test => 400..510,
            DatasetSelection::Validation => 400..450,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetSelection::Train => "train",
            DatasetSelection::Test => "test",
            DatasetSelection::Validation => "validation",
        }
    }
}

impl fmt::Display for DatasetSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetSelection {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "train" => Ok(DatasetSelection::Train),
            "test" => Ok(DatasetSelection::Test),
            "validation" | "val" => Ok(DatasetSelection::Validation),
            other => Err(AppError::ValidationError(format!(
                "Unknown dataset selection '{}', expected train, test or validation",
                other
            ))),
        }
    }
}

/// Which examples to keep based on whether any gold answer survived truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelFilter {
    #[default]
    Any,
    EmptyOnly,
    NonEmptyOnly,
}

impl LabelFilter {
    pub fn accepts(&self, gold_answers: &[String]) -> bool {
        match self {
            LabelFilter::Any => true,
            LabelFilter::EmptyOnly => gold_answers.is_empty(),
            LabelFilter::NonEmptyOnly => !gold_answers.is_empty(),
        }
    }
}

impl FromStr for LabelFilter {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(LabelFilter::Any),
            "empty" | "empty-only" => Ok(LabelFilter::EmptyOnly),
            "non-empty" | "non-empty-only" => Ok(LabelFilter::NonEmptyOnly),
            other => Err(AppError::ValidationError(format!(
                "Unknown label filter '{}', expected any, empty or non-empty",
                other
            ))),
        }
    }
}
