use serde::{Deserialize, Serialize};

/// One line of the evaluation file: what the model highlighted next to the gold spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRow {
    pub prediction: Vec<String>,
    pub label: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrecisionRecall {
    pub precision: f64,
    pub recall: f64,
}
