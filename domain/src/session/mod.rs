//! Conversation and chat-message entities.

pub mod entities;

pub use entities::{
    prompt_with_system, Conversation, ConversationEntry, ConversationSummary, Message, Role,
    DEFAULT_TITLE,
};
