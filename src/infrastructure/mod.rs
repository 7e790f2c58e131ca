pub mod artifact_store;
pub mod config;
pub mod jsonl;
pub mod llm_clients;
pub mod security;
