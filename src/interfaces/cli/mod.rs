pub mod commands;
pub mod state;

use crate::application::use_cases::inference::InferenceMode;
use crate::domain::error::Result;
use crate::domain::qa_example::{DatasetSelection, LabelFilter};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cuad-highlight", version, about = "CUAD clause highlighting with Mistral fine-tuning and batch inference")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    /// TOML config file (defaults to ./cuad-highlight.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Debug logging unless RUST_LOG is set
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the fine-tuning JSONL for a split and optionally upload it
    Generate {
        #[arg(long, default_value = "train")]
        split: DatasetSelection,
        /// any, empty or non-empty
        #[arg(long, default_value = "non-empty")]
        labels: LabelFilter,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        upload: bool,
    },
    /// Create a fine-tuning job from uploaded file ids
    FineTune {
        #[arg(long = "training-file", required = true)]
        training_files: Vec<String>,
        #[arg(long = "validation-file")]
        validation_files: Vec<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long, default_value_t = 10)]
        training_steps: u32,
        #[arg(long, default_value_t = 0.0001)]
        learning_rate: f64,
    },
    /// Predict highlights for a split and write the evaluation file
    Infer {
        #[arg(long, default_value = "test")]
        split: DatasetSelection,
        #[arg(long, default_value = "any")]
        labels: LabelFilter,
        /// batch or single
        #[arg(long, default_value = "batch")]
        mode: InferenceMode,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print precision and recall for an evaluation file
    Evaluate {
        #[arg(long, default_value = "test")]
        split: DatasetSelection,
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Manage the API key stored in the OS keyring
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum AuthAction {
    /// Store a key; read from stdin when omitted
    Set { key: Option<String> },
    Delete,
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();
    match cli.command {
        Command::Generate {
            split,
            labels,
            output,
            upload,
        } => commands::generate(config, split, labels, output, upload).await,
        Command::FineTune {
            training_files,
            validation_files,
            model,
            training_steps,
            learning_rate,
        } => {
            commands::fine_tune(
                config,
                &training_files,
                &validation_files,
                model.as_deref(),
                training_steps,
                learning_rate,
            )
            .await
        }
        Command::Infer {
            split,
            labels,
            mode,
            model,
            output,
        } => commands::infer(config, split, labels, mode, model.as_deref(), output).await,
        Command::Evaluate { split, input } => commands::evaluate(config, split, input),
        Command::Auth { action } => match action {
            AuthAction::Set { key } => commands::auth_set(key),
            AuthAction::Delete => commands::auth_delete(),
        },
    }
}
