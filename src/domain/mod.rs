pub mod batch_job;
pub mod conversation;
pub mod error;
pub mod evaluation;
pub mod fine_tuning;
pub mod llm_config;
pub mod prompt;
pub mod qa_example;
