use super::normalizer::normalize_answer;
use crate::domain::error::{AppError, Result};
use crate::domain::evaluation::PrecisionRecall;

/// Mean per-example precision and recall of predicted spans against gold spans.
///
/// Both per-example scores count, for each predicted span, whether it matches
/// any gold span after normalization. Recall divides that same count by the
/// number of gold spans, so duplicated predictions can push it above what a
/// set-based recall would report.
pub fn compute_precision_recall(
    predictions: &[Vec<String>],
    labels: &[Vec<String>],
) -> Result<PrecisionRecall> {
    if predictions.len() != labels.len() || predictions.is_empty() {
        return Err(AppError::LengthMismatch {
            predictions: predictions.len(),
            labels: labels.len(),
        });
    }

    let mut precision = 0.0;
    let mut recall = 0.0;

    for (prediction, label) in predictions.iter().zip(labels) {
        let normalized_predictions: Vec<String> =
            prediction.iter().map(|p| normalize_answer(p)).collect();
        let normalized_labels: Vec<String> = label.iter().map(|l| normalize_answer(l)).collect();

        precision += precision_score(&normalized_predictions, &normalized_labels);
        recall += recall_score(&normalized_predictions, &normalized_labels);
    }

    let total = predictions.len() as f64;
    Ok(PrecisionRecall {
        precision: precision / total,
        recall: recall / total,
    })
}

pub fn precision_score(prediction: &[String], ground_truth: &[String]) -> f64 {
    if prediction.is_empty() {
        return 0.0;
    }
    matched_count(prediction, ground_truth) / prediction.len() as f64
}

pub fn recall_score(prediction: &[String], ground_truth: &[String]) -> f64 {
    if ground_truth.is_empty() {
        return 0.0;
    }
    matched_count(prediction, ground_truth) / ground_truth.len() as f64
}

fn matched_count(prediction: &[String], ground_truth: &[String]) -> f64 {
    prediction
        .iter()
        .map(|p| metric_max_over_ground_truths(exact_match_score, p, ground_truth))
        .sum()
}

pub fn metric_max_over_ground_truths<F>(metric: F, prediction: &str, ground_truths: &[String]) -> f64
where
    F: Fn(&str, &str) -> f64,
{
    ground_truths
        .iter()
        .map(|truth| metric(prediction, truth))
        .fold(0.0, f64::max)
}

pub fn exact_match_score(prediction: &str, ground_truth: &str) -> f64 {
    if prediction == ground_truth {
        1.0
    } else {
        0.0
    }
}
