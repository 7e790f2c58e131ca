use crate::domain::error::{AppError, Result};
use crate::domain::prompt::HIGHLIGHT_CATEGORIES;
use crate::domain::qa_example::{DatasetSelection, LabelFilter, QaExample};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// SQuAD-shaped CUAD corpus.
#[derive(Debug, Clone, Deserialize)]
pub struct CuadCorpus {
    pub data: Vec<CuadContract>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CuadContract {
    #[serde(default)]
    pub title: String,
    pub paragraphs: Vec<CuadParagraph>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CuadParagraph {
    pub context: String,
    pub qas: Vec<CuadQuestion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CuadQuestion {
    #[serde(default)]
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub answers: Vec<CuadAnswer>,
    #[serde(default)]
    pub is_impossible: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CuadAnswer {
    pub text: String,
    #[serde(default)]
    pub answer_start: Option<usize>,
}

pub fn load_corpus(path: &Path) -> Result<CuadCorpus> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::IoError(format!("Failed to read corpus {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        AppError::ParseError(format!("Invalid CUAD corpus {}: {}", path.display(), e))
    })
}

/// Keeps questions about the highlight categories, truncates each contract to
/// `character_limit` characters, and keeps only the gold spans that survive.
pub fn extract_qa_examples(
    corpus: &CuadCorpus,
    selection: DatasetSelection,
    label_filter: LabelFilter,
    character_limit: usize,
) -> Vec<QaExample> {
    let range = selection.contract_range();
    let total_contracts = corpus.data.len();
    let mut examples = Vec::new();

    for (contract_number, contract) in corpus.data.iter().enumerate() {
        if !range.contains(&contract_number) {
            continue;
        }
        debug!(
            "Processing contract {}/{} ({})",
            contract_number + 1,
            total_contracts,
            contract.title
        );

        let total_paragraphs = contract.paragraphs.len();
        for (paragraph_number, paragraph) in contract.paragraphs.iter().enumerate() {
            debug!(
                "Processing paragraph {}/{} in contract {}",
                paragraph_number + 1,
                total_paragraphs,
                contract_number + 1
            );
            let chunk = truncate_chars(&paragraph.context, character_limit);

            for qa in &paragraph.qas {
                if !mentions_highlight_category(&qa.question) {
                    continue;
                }
                let gold_answers: Vec<String> = qa
                    .answers
                    .iter()
                    .filter(|answer| chunk.contains(answer.text.as_str()))
                    .map(|answer| answer.text.clone())
                    .collect();

                if label_filter.accepts(&gold_answers) {
                    examples.push(QaExample {
                        question: qa.question.clone(),
                        context: chunk.to_string(),
                        gold_answers,
                    });
                }
            }
        }
    }

    info!(
        split = %selection,
        examples = examples.len(),
        "Extracted QA examples"
    );
    examples
}

fn mentions_highlight_category(question: &str) -> bool {
    HIGHLIGHT_CATEGORIES
        .iter()
        .any(|category| question.contains(category))
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
