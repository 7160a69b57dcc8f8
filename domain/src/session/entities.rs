//! Session domain entities

use crate::core::model::Model;
use crate::orchestration::value_objects::CouncilTurn;
use serde::{Deserialize, Serialize};

/// Title given to a conversation before one is generated.
pub const DEFAULT_TITLE: &str = "New Conversation";

/// Role of a message in a chat prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A role-tagged message in a chat prompt (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One stored entry in a conversation: either the user's message or the
/// council turn that answered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ConversationEntry {
    User { content: String },
    Assistant { turn: CouncilTurn },
}

/// A stored conversation (Entity)
///
/// Append-only per turn: the user message lands before the pipeline runs,
/// the completed turn afterwards. Timestamps are RFC 3339 strings written
/// by the storage adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub created_at: String,
    pub title: String,
    pub messages: Vec<ConversationEntry>,
}

impl Conversation {
    pub fn new(id: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: created_at.into(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
        }
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.messages.push(ConversationEntry::User {
            content: content.into(),
        });
    }

    pub fn add_turn(&mut self, turn: CouncilTurn) {
        self.messages.push(ConversationEntry::Assistant { turn });
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Whether the next user message would be the conversation's first.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Flatten prior turns into role-tagged context for Stage 1: the user
    /// messages as-is, each answered turn as the chairman's final text.
    pub fn context_messages(&self) -> Vec<Message> {
        self.messages
            .iter()
            .map(|entry| match entry {
                ConversationEntry::User { content } => Message::user(content.clone()),
                ConversationEntry::Assistant { turn } => {
                    Message::assistant(turn.stage3.text.clone())
                }
            })
            .collect()
    }

    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id.clone(),
            created_at: self.created_at.clone(),
            title: self.title.clone(),
            message_count: self.messages.len(),
        }
    }
}

/// Conversation metadata for list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub created_at: String,
    pub title: String,
    pub message_count: usize,
}

/// Assemble a chat prompt: system instruction, prior history, user turn.
pub fn prompt_with_system(system: &str, history: &[Message], user: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system));
    messages.extend_from_slice(history);
    messages.push(Message::user(user));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::council::aggregate::AggregateRanking;
    use crate::orchestration::value_objects::{
        ModelResponse, Stage1Result, Stage2Result, SynthesisResult,
    };

    fn turn(answer: &str) -> CouncilTurn {
        CouncilTurn::new(
            "q",
            Stage1Result::new(vec![ModelResponse::success(Model::Gpt4o, "a")]),
            Stage2Result::default(),
            AggregateRanking::default(),
            SynthesisResult::new(Model::Gpt4o, answer),
        )
    }

    #[test]
    fn test_conversation_starts_untitled_and_empty() {
        let conv = Conversation::new("c1", "2026-08-07T00:00:00Z");
        assert_eq!(conv.title, DEFAULT_TITLE);
        assert!(conv.is_empty());
    }

    #[test]
    fn test_context_flattens_turns_to_final_answers() {
        let mut conv = Conversation::new("c1", "2026-08-07T00:00:00Z");
        conv.add_user_message("first question");
        conv.add_turn(turn("first answer"));
        conv.add_user_message("second question");

        let context = conv.context_messages();
        assert_eq!(context.len(), 3);
        assert_eq!(context[0].role, Role::User);
        assert_eq!(context[1].role, Role::Assistant);
        assert_eq!(context[1].content, "first answer");
        assert_eq!(context[2].content, "second question");
    }

    #[test]
    fn test_entry_serde_tags_role() {
        let entry = ConversationEntry::User {
            content: "hello".into(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""role":"user""#));
    }
}
