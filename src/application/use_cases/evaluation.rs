use super::scoring::compute_precision_recall;
use crate::domain::error::{AppError, Result};
use crate::domain::evaluation::{EvaluationRow, PrecisionRecall};
use crate::infrastructure::artifact_store::atomic_write_bytes;
use crate::infrastructure::jsonl::{read_jsonl, to_jsonl};
use std::path::Path;
use tracing::info;

/// Pairs predictions with labels and writes one `{prediction, label}` row each.
pub fn write_predictions_file(
    path: &Path,
    predictions: Vec<Vec<String>>,
    labels: Vec<Vec<String>>,
) -> Result<()> {
    if predictions.len() != labels.len() {
        return Err(AppError::LengthMismatch {
            predictions: predictions.len(),
            labels: labels.len(),
        });
    }
    let rows: Vec<EvaluationRow> = predictions
        .into_iter()
        .zip(labels)
        .map(|(prediction, label)| EvaluationRow { prediction, label })
        .collect();

    atomic_write_bytes(path, to_jsonl(&rows)?.as_bytes())?;
    info!(path = %path.display(), rows = rows.len(), "Wrote predictions file");
    Ok(())
}

pub fn evaluate_predictions_file(path: &Path) -> Result<PrecisionRecall> {
    let rows: Vec<EvaluationRow> = read_jsonl(path)?;
    let (predictions, labels): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .map(|row| (row.prediction, row.label))
        .unzip();

    let results = compute_precision_recall(&predictions, &labels)?;
    info!(
        path = %path.display(),
        precision = results.precision,
        recall = results.recall,
        "Evaluation results"
    );
    Ok(results)
}
