//! Orchestration domain entities

use crate::core::error::DomainError;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// Stage of a council turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Stage 1 - every council member answers the question independently
    ResponseCollection,
    /// Stage 2 - members rank each other's anonymized answers
    PeerRanking,
    /// Stage 3 - the chairman synthesizes the final answer
    Synthesis,
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::ResponseCollection => "responses",
            Stage::PeerRanking => "rankings",
            Stage::Synthesis => "synthesis",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Stage::ResponseCollection => "Council Responses",
            Stage::PeerRanking => "Peer Rankings",
            Stage::Synthesis => "Chairman Synthesis",
        }
    }

    /// Stage number (1-indexed) for display and event naming.
    pub fn number(&self) -> u8 {
        match self {
            Stage::ResponseCollection => 1,
            Stage::PeerRanking => 2,
            Stage::Synthesis => 3,
        }
    }

    /// The stage that must complete before this one may start.
    pub fn predecessor(&self) -> Option<Stage> {
        match self {
            Stage::ResponseCollection => None,
            Stage::PeerRanking => Some(Stage::ResponseCollection),
            Stage::Synthesis => Some(Stage::PeerRanking),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Configuration for a council (Entity)
///
/// Immutable once constructed: membership order fixes the Stage-1 result
/// order and the positional label assignment. Passed into the orchestrator
/// at construction so independent councils can run concurrently with
/// different configurations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilConfig {
    /// Council members, in configuration order
    pub members: Vec<Model>,
    /// Model that synthesizes the final answer (need not be a member)
    pub chairman: Model,
    /// Lightweight model used for conversation titles
    pub title_model: Model,
}

impl Default for CouncilConfig {
    fn default() -> Self {
        Self {
            members: Model::default_council(),
            chairman: Model::default_chairman(),
            title_model: Model::default_title_model(),
        }
    }
}

impl CouncilConfig {
    pub fn new(members: Vec<Model>) -> Self {
        Self {
            members,
            ..Default::default()
        }
    }

    pub fn with_chairman(mut self, chairman: Model) -> Self {
        self.chairman = chairman;
        self
    }

    pub fn with_title_model(mut self, title_model: Model) -> Self {
        self.title_model = title_model;
        self
    }

    /// Number of council members.
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.members.is_empty() {
            return Err(DomainError::NoMembers);
        }
        Ok(())
    }
}
