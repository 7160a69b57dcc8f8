//! Domain layer for llm-council
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! A fixed set of models that each answer the user's question independently
//! (Stage 1), then rank each other's anonymized answers (Stage 2). A
//! designated chairman model synthesizes the final reply from the answers
//! and the aggregated rankings (Stage 3).
//!
//! ## Anonymity
//!
//! During peer ranking each answer is shown under an opaque positional
//! label ("Response A", ...). The label→model map never reaches a model;
//! it exists only so the aggregator can attribute scores afterwards.

pub mod core;
pub mod council;
pub mod orchestration;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use crate::core::{error::Failure, error::FailureKind, DomainError, Model, Question};
pub use council::{
    anonymize, parse_ranking, AggregateRanking, AnonymousAnswer, Label, LabelMap, ModelScore,
    RankingParseError, RankingSubmission, ScoringRule,
};
pub use orchestration::{
    CouncilConfig, CouncilTurn, ModelResponse, PartialTurn, Stage, Stage1Result, Stage2Result,
    SynthesisResult, TurnEvent, TurnPhase, TurnState,
};
pub use prompt::PromptTemplate;
pub use session::{
    prompt_with_system, Conversation, ConversationEntry, ConversationSummary, Message, Role,
    DEFAULT_TITLE,
};
