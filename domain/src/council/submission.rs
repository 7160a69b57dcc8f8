//! Ranking submissions collected during Stage 2.

use super::label::Label;
use crate::core::error::Failure;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// One judge's preference order over the anonymous labels it was shown,
/// or a recorded failure.
///
/// A submission with a parse failure keeps the raw reply text so callers
/// can render what the judge actually said.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingSubmission {
    /// The model acting as judge.
    pub judge: Model,
    /// Labels in the judge's preference order, best first. Empty when the
    /// submission failed.
    pub ordered_labels: Vec<Label>,
    /// The judge's full free-form reply.
    pub raw_text: String,
    /// Set when the invocation failed or the reply yielded no labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Failure>,
}

impl RankingSubmission {
    /// A successfully parsed ranking.
    pub fn ranked(judge: Model, ordered_labels: Vec<Label>, raw_text: impl Into<String>) -> Self {
        Self {
            judge,
            ordered_labels,
            raw_text: raw_text.into(),
            error: None,
        }
    }

    /// A failed submission (gateway failure or unparseable reply).
    pub fn failed(judge: Model, error: Failure) -> Self {
        Self {
            judge,
            ordered_labels: Vec::new(),
            raw_text: String::new(),
            error: Some(error),
        }
    }

    /// Attach the raw reply text (for parse failures where a reply exists).
    pub fn with_raw_text(mut self, raw_text: impl Into<String>) -> Self {
        self.raw_text = raw_text.into();
        self
    }

    /// Whether this submission carries a usable ranking.
    pub fn is_ranked(&self) -> bool {
        self.error.is_none() && !self.ordered_labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_submission() {
        let sub = RankingSubmission::ranked(
            Model::Gpt4o,
            vec![Label::nth(1), Label::nth(0)],
            "I prefer Response B.\nFINAL RANKING:\n1. Response B\n2. Response A",
        );
        assert!(sub.is_ranked());
        assert_eq!(sub.ordered_labels.len(), 2);
    }

    #[test]
    fn test_failed_submission() {
        let sub = RankingSubmission::failed(Model::Gpt4o, Failure::timeout());
        assert!(!sub.is_ranked());
        assert!(sub.ordered_labels.is_empty());
    }

    #[test]
    fn test_unparseable_keeps_raw_text() {
        let sub = RankingSubmission::failed(
            Model::Gpt4o,
            Failure::malformed("no recognized labels"),
        )
        .with_raw_text("I refuse to rank my peers.");
        assert!(!sub.is_ranked());
        assert_eq!(sub.raw_text, "I refuse to rank my peers.");
    }
}
