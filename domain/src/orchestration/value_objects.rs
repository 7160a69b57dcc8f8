//! Orchestration value objects - immutable result types for council turns.
//!
//! These types represent the outputs of each stage:
//! - [`ModelResponse`] - one member's answer (or failure) from Stage 1
//! - [`Stage1Result`] - all Stage-1 answers in council order
//! - [`Stage2Result`] - all ranking submissions plus the label map
//! - [`SynthesisResult`] - the chairman's final answer
//! - [`CouncilTurn`] - the complete persisted unit for one user message

use crate::core::error::Failure;
use crate::core::model::Model;
use crate::council::aggregate::AggregateRanking;
use crate::council::label::LabelMap;
use crate::council::submission::RankingSubmission;
use serde::{Deserialize, Serialize};

/// Response from a single council member in Stage 1.
///
/// Exactly one of `text`/`error` is set; constructors enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The model that produced (or failed to produce) this answer
    pub model: Model,
    /// The answer text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// The recorded failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Failure>,
}

impl ModelResponse {
    /// Creates a successful response from a member.
    pub fn success(model: Model, text: impl Into<String>) -> Self {
        Self {
            model,
            text: Some(text.into()),
            error: None,
        }
    }

    /// Creates a failed response recording why the member produced nothing.
    pub fn failure(model: Model, error: Failure) -> Self {
        Self {
            model,
            text: None,
            error: Some(error),
        }
    }

    /// Returns `true` if this member answered.
    pub fn is_success(&self) -> bool {
        self.text.is_some()
    }
}

/// All Stage-1 responses, one per configured member, in council order.
///
/// Failures are recorded, not dropped: the length always equals the council
/// size so downstream indexing stays deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stage1Result {
    pub responses: Vec<ModelResponse>,
}

impl Stage1Result {
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self { responses }
    }

    /// Returns an iterator over only the successful responses.
    pub fn successful(&self) -> impl Iterator<Item = &ModelResponse> {
        self.responses.iter().filter(|r| r.is_success())
    }

    /// Returns an iterator over only the failed responses.
    pub fn failed(&self) -> impl Iterator<Item = &ModelResponse> {
        self.responses.iter().filter(|r| !r.is_success())
    }

    /// Count of members that answered.
    pub fn success_count(&self) -> usize {
        self.successful().count()
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

/// All Stage-2 ranking submissions, one per judge, in council order,
/// together with the label map used to attribute them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stage2Result {
    pub submissions: Vec<RankingSubmission>,
    /// The label→model map for this turn. Kept with the stored turn so
    /// persisted rankings stay auditable.
    pub label_map: LabelMap,
}

impl Stage2Result {
    pub fn new(submissions: Vec<RankingSubmission>, label_map: LabelMap) -> Self {
        Self {
            submissions,
            label_map,
        }
    }

    /// Submissions that carry a usable ranking.
    pub fn ranked(&self) -> impl Iterator<Item = &RankingSubmission> {
        self.submissions.iter().filter(|s| s.is_ranked())
    }

    pub fn ranked_count(&self) -> usize {
        self.ranked().count()
    }
}

/// Final synthesis from the chairman.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    /// The model that performed the synthesis
    pub chairman: Model,
    /// The synthesized final answer
    pub text: String,
}

impl SynthesisResult {
    pub fn new(chairman: Model, text: impl Into<String>) -> Self {
        Self {
            chairman,
            text: text.into(),
        }
    }
}

/// Complete result of one council turn: created once per user message and
/// never mutated after the turn completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilTurn {
    /// The original question
    pub question: String,
    /// Stage 1: every member's answer or recorded failure
    pub stage1: Stage1Result,
    /// Stage 2: peer rankings plus the label map
    pub stage2: Stage2Result,
    /// Consensus ranking derived from Stage 2
    pub aggregate: AggregateRanking,
    /// Stage 3: the chairman's final answer
    pub stage3: SynthesisResult,
}

impl CouncilTurn {
    pub fn new(
        question: impl Into<String>,
        stage1: Stage1Result,
        stage2: Stage2Result,
        aggregate: AggregateRanking,
        stage3: SynthesisResult,
    ) -> Self {
        Self {
            question: question.into(),
            stage1,
            stage2,
            aggregate,
            stage3,
        }
    }
}

/// The stage data salvaged from a turn that failed partway through.
///
/// A chairman failure is fatal for the turn, but Stages 1-2 already ran;
/// callers can still render "partial council, synthesis failed."
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialTurn {
    pub stage1: Stage1Result,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage2: Option<Stage2Result>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<AggregateRanking>,
}
