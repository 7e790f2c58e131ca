//! Maps batch result lines back onto request positions.
//!
//! Result files come back in arbitrary order, may miss ids the remote job
//! dropped, and may repeat ids (last line wins). Per-record decode problems
//! are logged and recovered as empty predictions; a predicted list holding
//! non-string elements aborts with `SchemaViolation`.

use crate::domain::batch_job::{BatchResultRecord, Prediction};
use crate::domain::error::{AppError, Result};
use serde_json::Value as JsonValue;
use std::path::Path;
use tracing::warn;

pub fn reconcile_file(path: &Path, n_queries: usize) -> Result<Vec<Vec<String>>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::IoError(format!("Failed to read batch results {}: {e}", path.display()))
    })?;
    parse_batch_results(&content, n_queries)
}

/// Returns exactly `n_queries` predictions, aligned to the request order.
pub fn parse_batch_results(content: &str, n_queries: usize) -> Result<Vec<Vec<String>>> {
    let mut predictions: Vec<Option<Prediction>> = vec![None; n_queries];

    for (line_number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record = match decode_result_line(line) {
            Ok(record) => record,
            Err(err) => {
                warn!(line = line_number + 1, error = %err, "Skipping undecodable batch result line");
                continue;
            }
        };

        let Some(slot) = predictions.get_mut(record.custom_id) else {
            warn!(
                custom_id = record.custom_id,
                n_queries, "Ignoring batch result with out-of-range custom_id"
            );
            continue;
        };

        let prediction = match record.raw_content {
            Some(raw) => resolve_prediction(&raw, record.custom_id)?,
            None => {
                warn!(
                    custom_id = record.custom_id,
                    "Batch result has no message content, using empty prediction"
                );
                Prediction::Empty
            }
        };
        *slot = Some(prediction);
    }

    Ok(predictions
        .into_iter()
        .map(|p| p.map(Prediction::into_answers).unwrap_or_default())
        .collect())
}

/// Pulls `custom_id` and `response.body.choices[0].message.content` out of one line.
pub fn decode_result_line(line: &str) -> Result<BatchResultRecord> {
    let value: JsonValue = serde_json::from_str(line)
        .map_err(|e| AppError::MalformedResult(format!("Invalid result line: {e}")))?;

    let custom_id = match value.get("custom_id") {
        Some(JsonValue::String(id)) => id.trim().parse::<usize>().ok(),
        Some(JsonValue::Number(id)) => id.as_u64().map(|id| id as usize),
        _ => None,
    }
    .ok_or_else(|| AppError::MalformedResult("Missing or non-integer custom_id".to_string()))?;

    let raw_content = value
        .pointer("/response/body/choices/0/message/content")
        .and_then(|content| content.as_str())
        .map(|content| content.to_string());

    Ok(BatchResultRecord {
        custom_id,
        raw_content,
    })
}

/// Decodes one model answer into a prediction.
///
/// Order of checks:
/// 1. not JSON -> empty
/// 2. object with `highlighted` string -> list literal inside it, else the raw string
/// 3. object with `highlighted` list -> that list
/// 4. top-level list -> that list
/// 5. anything else -> empty
pub fn resolve_prediction(raw_content: &str, custom_id: usize) -> Result<Prediction> {
    let parsed: JsonValue = match serde_json::from_str(raw_content) {
        Ok(value) => value,
        Err(err) => {
            let malformed = AppError::MalformedResult(err.to_string());
            warn!(custom_id, error = %malformed, content = raw_content, "Error decoding JSON from response content");
            return Ok(Prediction::Empty);
        }
    };

    match parsed {
        JsonValue::Object(mut map) if map.contains_key("highlighted") => {
            match map.remove("highlighted").unwrap_or(JsonValue::Null) {
                JsonValue::String(text) => match parse_python_string_list(&text) {
                    Some(items) => Ok(Prediction::List(items)),
                    None => {
                        warn!(custom_id, highlighted = %text, "Error parsing highlighted predictions, keeping raw string");
                        Ok(Prediction::RawString(text))
                    }
                },
                JsonValue::Array(items) => string_items(items, custom_id).map(Prediction::List),
                JsonValue::Null => Ok(Prediction::Empty),
                other => {
                    warn!(custom_id, highlighted = %other, "Unexpected highlighted value, using empty prediction");
                    Ok(Prediction::Empty)
                }
            }
        }
        JsonValue::Array(items) => string_items(items, custom_id).map(Prediction::List),
        other => {
            warn!(custom_id, content = %other, "Response content has no highlighted field, using empty prediction");
            Ok(Prediction::Empty)
        }
    }
}

fn string_items(items: Vec<JsonValue>, custom_id: usize) -> Result<Vec<String>> {
    items
        .into_iter()
        .map(|item| match item {
            JsonValue::String(text) => Ok(text),
            other => Err(AppError::SchemaViolation(format!(
                "Expected predictions to be a list of strings (custom_id {}), found {}",
                custom_id, other
            ))),
        })
        .collect()
}

/// Parses a Python-style list literal of strings such as `['a', "b"]`.
///
/// Returns `None` for anything that is not exactly a list of string literals.
pub fn parse_python_string_list(text: &str) -> Option<Vec<String>> {
    let mut chars = text.trim().chars().peekable();
    if chars.next()? != '[' {
        return None;
    }

    let mut items = Vec::new();
    loop {
        skip_whitespace(&mut chars);
        match chars.peek()? {
            ']' => {
                chars.next();
                break;
            }
            '\'' | '"' => {
                items.push(parse_quoted(&mut chars)?);
                skip_whitespace(&mut chars);
                match chars.next()? {
                    ',' => continue,
                    ']' => break,
                    _ => return None,
                }
            }
            _ => return None,
        }
    }

    if chars.next().is_some() {
        return None;
    }
    Some(items)
}

fn skip_whitespace(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    while chars.peek().map(|c| c.is_whitespace()).unwrap_or(false) {
        chars.next();
    }
}

fn parse_quoted(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
    let quote = chars.next()?;
    let mut out = String::new();
    loop {
        match chars.next()? {
            c if c == quote => return Some(out),
            '\n' => return None,
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'a' => out.push('\u{7}'),
                'b' => out.push('\u{8}'),
                'f' => out.push('\u{c}'),
                'v' => out.push('\u{b}'),
                first @ '0'..='7' => out.push(octal_escape(chars, first)?),
                '\\' => out.push('\\'),
                '\'' => out.push('\''),
                '"' => out.push('"'),
                '\n' => {}
                'x' => out.push(hex_escape(chars, 2)?),
                'u' => out.push(hex_escape(chars, 4)?),
                'U' => out.push(hex_escape(chars, 8)?),
                other => {
                    out.push('\\');
                    out.push(other);
                }
            },
            c => out.push(c),
        }
    }
}

/// Up to three octal digits, `first` already consumed.
fn octal_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, first: char) -> Option<char> {
    let mut value = first.to_digit(8)?;
    for _ in 0..2 {
        match chars.peek().and_then(|c| c.to_digit(8)) {
            Some(digit) => {
                value = value * 8 + digit;
                chars.next();
            }
            None => break,
        }
    }
    char::from_u32(value)
}

fn hex_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, digits: usize) -> Option<char> {
    let mut code = 0u32;
    for _ in 0..digits {
        code = code * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_line(custom_id: &str, content: &str) -> String {
        serde_json::json!({
            "id": format!("batch-{}", custom_id),
            "custom_id": custom_id,
            "response": {
                "status_code": 200,
                "body": {
                    "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
                }
            }
        })
        .to_string()
    }

    #[test]
    fn test_missing_ids_default_to_empty() {
        let content = [
            result_line("2", r#"{"highlighted": ["c"]}"#),
            result_line("0", r#"{"highlighted": ["a"]}"#),
        ]
        .join("\n");

        let predictions = parse_batch_results(&content, 3).unwrap();
        assert_eq!(predictions.len(), 3);
        assert_eq!(predictions[0], vec!["a".to_string()]);
        assert!(predictions[1].is_empty());
        assert_eq!(predictions[2], vec!["c".to_string()]);
    }

    #[test]
    fn test_not_json_content_yields_empty() {
        let content = result_line("0", "not json");
        let predictions = parse_batch_results(&content, 1).unwrap();
        assert_eq!(predictions, vec![Vec::<String>::new()]);
    }

    #[test]
    fn test_highlighted_string_list_literal() {
        let prediction = resolve_prediction(r#"{"highlighted": "['a','b']"}"#, 0).unwrap();
        assert_eq!(prediction, Prediction::List(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_highlighted_unparseable_string_kept_raw() {
        let prediction = resolve_prediction(r#"{"highlighted": "Acme Corp"}"#, 0).unwrap();
        assert_eq!(prediction, Prediction::RawString("Acme Corp".to_string()));
    }

    #[test]
    fn test_top_level_list_accepted() {
        let prediction = resolve_prediction(r#"["x", "y"]"#, 4).unwrap();
        assert_eq!(prediction, Prediction::List(vec!["x".to_string(), "y".to_string()]));
        assert_eq!(resolve_prediction("[]", 4).unwrap(), Prediction::List(Vec::new()));
    }

    #[test]
    fn test_non_string_list_is_schema_violation() {
        let err = resolve_prediction(r#"["x", 3]"#, 7).unwrap_err();
        assert!(matches!(err, AppError::SchemaViolation(_)));

        let content = result_line("0", r#"{"highlighted": [1, 2]}"#);
        assert!(matches!(
            parse_batch_results(&content, 1),
            Err(AppError::SchemaViolation(_))
        ));
    }

    #[test]
    fn test_other_shapes_recover_as_empty() {
        assert_eq!(resolve_prediction(r#"{"answer": ["x"]}"#, 0).unwrap(), Prediction::Empty);
        assert_eq!(resolve_prediction("42", 0).unwrap(), Prediction::Empty);
        assert_eq!(resolve_prediction(r#"{"highlighted": null}"#, 0).unwrap(), Prediction::Empty);
        assert_eq!(resolve_prediction(r#"{"highlighted": 5}"#, 0).unwrap(), Prediction::Empty);
    }

    #[test]
    fn test_duplicate_ids_last_wins() {
        let content = [
            result_line("0", r#"{"highlighted": ["first"]}"#),
            result_line("0", r#"{"highlighted": ["second"]}"#),
        ]
        .join("\n");

        let predictions = parse_batch_results(&content, 1).unwrap();
        assert_eq!(predictions, vec![vec!["second".to_string()]]);
    }

    #[test]
    fn test_bad_envelopes_are_skipped() {
        let error_record = serde_json::json!({
            "custom_id": "1",
            "response": {"status_code": 500, "body": {"message": "internal error"}}
        })
        .to_string();
        let content = [
            "garbage".to_string(),
            r#"{"custom_id": "abc"}"#.to_string(),
            error_record,
            result_line("9", r#"{"highlighted": ["ignored"]}"#),
            String::new(),
            result_line("0", r#"{"highlighted": ["kept"]}"#),
        ]
        .join("\n");

        let predictions = parse_batch_results(&content, 2).unwrap();
        assert_eq!(predictions, vec![vec!["kept".to_string()], Vec::new()]);
    }

    #[test]
    fn test_decode_numeric_custom_id() {
        let record = decode_result_line(r#"{"custom_id": 3}"#).unwrap();
        assert_eq!(record.custom_id, 3);
        assert_eq!(record.raw_content, None);
    }

    #[test]
    fn test_python_list_literal_parser() {
        assert_eq!(parse_python_string_list("[]"), Some(Vec::new()));
        assert_eq!(
            parse_python_string_list(r#" [ "it's", 'say \'hi\'', ] "#),
            Some(vec!["it's".to_string(), "say 'hi'".to_string()])
        );
        assert_eq!(
            parse_python_string_list(r"['caf\xe9\n']"),
            Some(vec!["café\n".to_string()])
        );
        assert_eq!(parse_python_string_list("['a' 'b']"), None);
    }

    #[test]
    fn test_python_list_literal_octal_escapes() {
        assert_eq!(
            parse_python_string_list(r"['\012', '\0', '\1019', '\x41\101']"),
            Some(vec![
                "\n".to_string(),
                "\0".to_string(),
                "A9".to_string(),
                "AA".to_string(),
            ])
        );
        assert_eq!(
            parse_python_string_list(r"['tab\11end']"),
            Some(vec!["tab\tend".to_string()])
        );
    }

    #[test]
    fn test_python_list_literal_rejects_malformed() {
        assert_eq!(parse_python_string_list("['a', 1]"), None);
        assert_eq!(parse_python_string_list("['a'] extra"), None);
        assert_eq!(parse_python_string_list("['unterminated]"), None);
        assert_eq!(parse_python_string_list("a, b"), None);
    }

    #[test]
    fn test_reconcile_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch_results.jsonl");
        std::fs::write(&path, result_line("1", r#"{"highlighted": "[\"b\"]"}"#)).unwrap();

        let predictions = reconcile_file(&path, 2).unwrap();
        assert_eq!(predictions, vec![Vec::new(), vec!["b".to_string()]]);
    }
}
