pub mod batch_inference;
pub mod conversation_builder;
pub mod dataset_extraction;
pub mod evaluation;
pub mod fine_tuning;
pub mod inference;
pub mod normalizer;
pub mod reconcile;
pub mod scoring;
pub mod single_inference;
