use super::state::AppState;
use crate::application::use_cases::conversation_builder::ConversationBuilder;
use crate::application::use_cases::evaluation::{evaluate_predictions_file, write_predictions_file};
use crate::application::use_cases::fine_tuning::dump_fine_tuning_dataset;
use crate::application::use_cases::inference::InferenceMode;
use crate::domain::error::{AppError, Result};
use crate::domain::fine_tuning::FineTuningHyperparameters;
use crate::domain::qa_example::{DatasetSelection, LabelFilter};
use crate::infrastructure::config::ConfigService;
use serde_json::json;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub async fn generate(
    config_file: Option<&Path>,
    split: DatasetSelection,
    labels: LabelFilter,
    output: Option<PathBuf>,
    upload: bool,
) -> Result<()> {
    let state = AppState::load(config_file)?;
    let examples = state.extract(split, labels)?;
    if examples.is_empty() {
        warn!(split = %split, "No examples matched; writing an empty dataset");
    }

    let path = output.unwrap_or_else(|| state.layout.fine_tuning_dataset_path(split));
    let written = dump_fine_tuning_dataset(&ConversationBuilder::default(), &examples, &path)?;

    let mut summary = json!({ "path": path.display().to_string(), "lines": written });
    if upload {
        let llm = state.llm_config(None)?;
        let uploaded = state.fine_tuning().upload_dataset(&llm, &path).await?;
        summary["file_id"] = json!(uploaded.id);
    }
    println!("{}", summary);
    Ok(())
}

pub async fn fine_tune(
    config_file: Option<&Path>,
    training_files: &[String],
    validation_files: &[String],
    model: Option<&str>,
    training_steps: u32,
    learning_rate: f64,
) -> Result<()> {
    let state = AppState::load(config_file)?;
    let llm = state.llm_config(model)?;
    let job = state
        .fine_tuning()
        .create_fine_tuning_job(
            &llm,
            training_files,
            validation_files,
            FineTuningHyperparameters {
                training_steps,
                learning_rate,
            },
        )
        .await?;
    println!("{}", json!({ "job_id": job.id, "status": job.status }));
    Ok(())
}

pub async fn infer(
    config_file: Option<&Path>,
    split: DatasetSelection,
    labels: LabelFilter,
    mode: InferenceMode,
    model: Option<&str>,
    output: Option<PathBuf>,
) -> Result<()> {
    let state = AppState::load(config_file)?;
    let examples = state.extract(split, labels)?;
    if examples.is_empty() {
        return Err(AppError::ValidationError(format!(
            "No examples selected for split {}",
            split
        )));
    }
    let llm = state.llm_config(model)?;

    let predictions = state
        .inference()
        .run_inference(&llm, &examples, mode)
        .await?;
    let gold: Vec<Vec<String>> = examples.into_iter().map(|e| e.gold_answers).collect();

    let path = output.unwrap_or_else(|| state.layout.predictions_path(split));
    write_predictions_file(&path, predictions, gold)?;
    println!("{}", json!({ "predictions": path.display().to_string() }));
    Ok(())
}

pub fn evaluate(
    config_file: Option<&Path>,
    split: DatasetSelection,
    input: Option<PathBuf>,
) -> Result<()> {
    let path = match input {
        Some(path) => path,
        None => AppState::load(config_file)?.layout.predictions_path(split),
    };
    let results = evaluate_predictions_file(&path)?;
    println!("{}", serde_json::to_string(&results)?);
    Ok(())
}

pub fn auth_set(key: Option<String>) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None => {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line
        }
    };
    ConfigService::new().save_api_key(&key)?;
    info!("API key stored in keyring");
    Ok(())
}

pub fn auth_delete() -> Result<()> {
    ConfigService::new().delete_api_key()?;
    info!("API key removed from keyring");
    Ok(())
}
