use crate::domain::batch_job::ResponseFormat;
use crate::domain::conversation::{Conversation, Highlights};
use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use crate::infrastructure::llm_clients::ChatClient;
use std::sync::Arc;
use tracing::{info, warn};

/// One chat completion per conversation, constrained to the highlights schema.
pub struct SingleInferenceUseCase {
    client: Arc<dyn ChatClient>,
}

impl SingleInferenceUseCase {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self { client }
    }

    pub async fn run(
        &self,
        config: &LLMConfig,
        conversations: &[Conversation],
    ) -> Result<Vec<Vec<String>>> {
        let response_format = ResponseFormat::highlights_schema();
        let total = conversations.len();
        let mut predictions = Vec::with_capacity(total);

        for (index, conversation) in conversations.iter().enumerate() {
            info!("Processing question {}/{}", index + 1, total);
            let content = self
                .client
                .complete(config, conversation, &response_format)
                .await?;
            predictions.push(decode_highlights(&content, index));
        }
        Ok(predictions)
    }
}

fn decode_highlights(content: &str, index: usize) -> Vec<String> {
    match serde_json::from_str::<Highlights>(content) {
        Ok(highlights) => highlights.highlighted,
        Err(e) => {
            warn!(index, error = %e, "Answer did not match the highlights schema; treating as empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::conversation_builder::ConversationBuilder;
    use crate::domain::error::AppError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedChat {
        replies: Mutex<VecDeque<Result<String>>>,
        formats: Mutex<Vec<String>>,
    }

    impl ScriptedChat {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().collect()),
                formats: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedChat {
        async fn complete(
            &self,
            _config: &LLMConfig,
            _messages: &Conversation,
            response_format: &ResponseFormat,
        ) -> Result<String> {
            self.formats.lock().unwrap().push(response_format.kind.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("{}".to_string()))
        }
    }

    fn conversations(n: usize) -> Vec<Conversation> {
        let builder = ConversationBuilder::new("system");
        (0..n).map(|i| builder.build(&format!("q{}", i), "ctx", None)).collect()
    }

    #[tokio::test]
    async fn test_decodes_each_answer_in_order() {
        let chat = Arc::new(ScriptedChat::new(vec![
            Ok(r#"{"highlighted": ["a", "b"]}"#.to_string()),
            Ok("not json".to_string()),
            Ok(r#"{"highlighted": []}"#.to_string()),
        ]));
        let use_case = SingleInferenceUseCase::new(chat.clone());

        let predictions = use_case
            .run(&LLMConfig::default(), &conversations(3))
            .await
            .unwrap();

        assert_eq!(
            predictions,
            vec![vec!["a".to_string(), "b".to_string()], Vec::new(), Vec::new()]
        );
        assert!(chat.formats.lock().unwrap().iter().all(|k| k == "json_schema"));
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        let chat = Arc::new(ScriptedChat::new(vec![Err(AppError::LLMError(
            "API error (500)".to_string(),
        ))]));
        let use_case = SingleInferenceUseCase::new(chat);

        let err = use_case
            .run(&LLMConfig::default(), &conversations(2))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::LLMError(_)));
    }
}
