use crate::domain::batch_job::{BatchJobRecord, BatchRequestBody, ResponseFormat};
use crate::domain::conversation::{Conversation, Role, Turn};
use crate::domain::fine_tuning::FineTuningLine;
use crate::domain::prompt::SYSTEM_PROMPT;
use crate::domain::qa_example::QaExample;

/// Builds the chat turns for one question over one contract chunk.
#[derive(Debug, Clone)]
pub struct ConversationBuilder {
    system_prompt: String,
}

impl Default for ConversationBuilder {
    fn default() -> Self {
        Self::new(SYSTEM_PROMPT)
    }
}

impl ConversationBuilder {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    /// System turn, context turn, question turn, and, when a gold answer is
    /// supplied, an assistant turn holding `{"highlighted": [...]}`.
    pub fn build(&self, question: &str, context: &str, gold_answer: Option<&[String]>) -> Conversation {
        let mut turns = vec![
            Turn::new(Role::System, self.system_prompt.clone()),
            Turn::new(Role::User, format!("Context: {}", context)),
            Turn::new(Role::User, format!("Question: {}", question)),
        ];

        if let Some(answer) = gold_answer {
            turns.push(Turn::new(Role::Assistant, highlights_json(answer)));
        }

        Conversation::new(turns)
    }

    pub fn build_for_training(&self, example: &QaExample) -> Conversation {
        self.build(&example.question, &example.context, Some(&example.gold_answers))
    }

    pub fn build_for_inference(&self, example: &QaExample) -> Conversation {
        self.build(&example.question, &example.context, None)
    }
}

/// `{"highlighted": ["a", "b"]}` with the spaced separators the training data uses.
fn highlights_json(answer: &[String]) -> String {
    let items = answer
        .iter()
        .map(|span| serde_json::Value::String(span.clone()).to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{\"highlighted\": [{}]}}", items)
}

pub fn format_fine_tuning_lines(conversations: &[Conversation]) -> Vec<FineTuningLine> {
    conversations
        .iter()
        .enumerate()
        .map(|(i, conversation)| FineTuningLine {
            prompt: conversation
                .turns()
                .get(1)
                .map(|turn| turn.content.clone())
                .unwrap_or_default(),
            prompt_id: i.to_string(),
            messages: conversation.clone(),
        })
        .collect()
}

/// Batch request lines; `custom_id` is the zero-based position in `conversations`.
pub fn format_inference_lines(conversations: &[Conversation]) -> Vec<BatchJobRecord> {
    conversations
        .iter()
        .enumerate()
        .map(|(i, conversation)| BatchJobRecord {
            custom_id: i.to_string(),
            body: BatchRequestBody {
                messages: conversation.clone(),
                response_format: ResponseFormat::json_object(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::Highlights;

    fn builder() -> ConversationBuilder {
        ConversationBuilder::new("You highlight contract clauses.")
    }

    #[test]
    fn test_inference_conversation_shape() {
        let conversation = builder().build("Who are the parties?", "Acme and Beta agree.", None);
        let turns = conversation.turns();

        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].role, Role::System);
        assert_eq!(turns[0].content, "You highlight contract clauses.");
        assert_eq!(turns[1], Turn::new(Role::User, "Context: Acme and Beta agree."));
        assert_eq!(turns[2], Turn::new(Role::User, "Question: Who are the parties?"));
        assert!(conversation.assistant_turn().is_none());
    }

    #[test]
    fn test_training_conversation_round_trip() {
        let gold = vec!["Acme Inc.".to_string(), "Beta \"LLC\"".to_string()];
        let conversation = builder().build("Parties?", "ctx", Some(&gold));

        assert_eq!(conversation.len(), 4);
        let assistant = conversation.assistant_turn().unwrap();
        assert_eq!(
            assistant.content,
            r#"{"highlighted": ["Acme Inc.", "Beta \"LLC\""]}"#
        );
        let decoded: Highlights = serde_json::from_str(&assistant.content).unwrap();
        assert_eq!(decoded.highlighted, gold);
    }

    #[test]
    fn test_empty_gold_answer_still_emits_assistant_turn() {
        let conversation = builder().build("Parties?", "ctx", Some(&[]));
        let assistant = conversation.assistant_turn().unwrap();
        assert_eq!(assistant.content, r#"{"highlighted": []}"#);
    }

    #[test]
    fn test_conversation_serializes_as_message_array() {
        let conversation = builder().build("q", "c", None);
        let value = serde_json::to_value(&conversation).unwrap();

        assert_eq!(value[0]["role"], "system");
        assert_eq!(value[1]["role"], "user");
        assert_eq!(value[2]["content"], "Question: q");
    }

    #[test]
    fn test_format_lines() {
        let conversations = vec![builder().build("q0", "c0", None), builder().build("q1", "c1", None)];

        let inference = format_inference_lines(&conversations);
        assert_eq!(inference[1].custom_id, "1");
        let value = serde_json::to_value(&inference[0]).unwrap();
        assert_eq!(value["body"]["response_format"]["type"], "json_object");
        assert!(value["body"]["response_format"].get("json_schema").is_none());

        let fine_tuning = format_fine_tuning_lines(&conversations);
        assert_eq!(fine_tuning[0].prompt, "Context: c0");
        assert_eq!(fine_tuning[1].prompt_id, "1");
    }
}
