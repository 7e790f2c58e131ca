use crate::domain::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// One JSON document per line, joined with `\n` and no trailing newline.
pub fn to_jsonl<T: Serialize>(items: &[T]) -> Result<String> {
    let lines = items
        .iter()
        .map(serde_json::to_string)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| AppError::ParseError(format!("Failed to encode JSONL line: {e}")))?;
    Ok(lines.join("\n"))
}

pub fn from_jsonl<T: DeserializeOwned>(content: &str) -> Result<Vec<T>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| {
                AppError::ParseError(format!("Invalid JSONL row at line {}: {e}", index + 1))
            })
        })
        .collect()
}

pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::IoError(format!("Failed to read {}: {e}", path.display())))?;
    from_jsonl(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evaluation::EvaluationRow;

    #[test]
    fn test_to_jsonl_has_no_trailing_newline() {
        let rows = vec![
            EvaluationRow {
                prediction: vec!["a".to_string()],
                label: vec![],
            },
            EvaluationRow {
                prediction: vec![],
                label: vec!["b".to_string()],
            },
        ];

        let encoded = to_jsonl(&rows).unwrap();
        assert_eq!(
            encoded,
            "{\"prediction\":[\"a\"],\"label\":[]}\n{\"prediction\":[],\"label\":[\"b\"]}"
        );
        let decoded: Vec<EvaluationRow> = from_jsonl(&encoded).unwrap();
        assert_eq!(decoded, rows);
    }

    #[test]
    fn test_from_jsonl_skips_blank_lines_and_reports_line_numbers() {
        let content = "{\"prediction\":[],\"label\":[]}\n\n{\"prediction\":5}\n";
        let err = from_jsonl::<EvaluationRow>(content).unwrap_err();
        assert!(err.to_string().contains("line 3"), "{}", err);
    }
}
