//! Application layer for llm-council
//!
//! This crate contains use cases, port definitions, and application
//! configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    conversation_store::{ConversationStore, NoopStore, StoreError},
    model_gateway::{GatewayError, ModelGateway},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::{
    GenerateTitleUseCase, RunCouncilError, RunCouncilInput, RunCouncilUseCase, TurnContext,
};
