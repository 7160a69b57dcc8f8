//! Conversation persistence port
//!
//! The conversation collaborator: append-only per turn. The user message is
//! appended before the pipeline runs and the completed turn afterwards;
//! nothing mutates a turn once stored.

use async_trait::async_trait;
use council_domain::{Conversation, ConversationSummary, CouncilTurn};
use thiserror::Error;

/// Errors from conversation persistence
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("conversation not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Io(String),

    #[error("corrupt conversation record: {0}")]
    Corrupt(String),
}

/// Port for storing conversations and their council turns.
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create a new empty conversation with a fresh id.
    async fn create(&self) -> Result<Conversation, StoreError>;

    /// Load a conversation with all its messages.
    async fn get(&self, id: &str) -> Result<Conversation, StoreError>;

    /// List stored conversations (metadata only), newest first.
    async fn list(&self) -> Result<Vec<ConversationSummary>, StoreError>;

    /// Append the user's message that opens a turn.
    async fn append_user_message(&self, id: &str, content: &str) -> Result<(), StoreError>;

    /// Append a completed council turn.
    async fn append_turn(&self, id: &str, turn: &CouncilTurn) -> Result<(), StoreError>;

    /// Replace the conversation title (side channel for the title generator).
    async fn update_title(&self, id: &str, title: &str) -> Result<(), StoreError>;
}

/// No-op store for tests and unsaved one-shot runs.
pub struct NoopStore;

#[async_trait]
impl ConversationStore for NoopStore {
    async fn create(&self) -> Result<Conversation, StoreError> {
        Ok(Conversation::new("unsaved", ""))
    }

    async fn get(&self, id: &str) -> Result<Conversation, StoreError> {
        Err(StoreError::NotFound(id.to_string()))
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>, StoreError> {
        Ok(Vec::new())
    }

    async fn append_user_message(&self, _id: &str, _content: &str) -> Result<(), StoreError> {
        Ok(())
    }

    async fn append_turn(&self, _id: &str, _turn: &CouncilTurn) -> Result<(), StoreError> {
        Ok(())
    }

    async fn update_title(&self, _id: &str, _title: &str) -> Result<(), StoreError> {
        Ok(())
    }
}
