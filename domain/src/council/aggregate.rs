//! Rank aggregation: per-judge label rankings → one consensus model ranking.

use super::label::LabelMap;
use super::scoring::ScoringRule;
use super::submission::RankingSubmission;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// One model's aggregate standing across all judges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    pub model: Model,
    /// Sum of points awarded by all judges.
    pub score: f64,
    /// How many judges put this model's label in first place.
    pub first_place_votes: usize,
}

/// The consensus ordering of council models, best first.
///
/// Aggregation is commutative over submissions and fully deterministic:
/// ties break on first-place votes, then on the lexicographic model
/// identifier, so identical inputs always produce identical orderings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateRanking {
    entries: Vec<ModelScore>,
}

impl AggregateRanking {
    /// Score every labeled model from the collected submissions.
    ///
    /// Failed or unparseable submissions contribute nothing; a submission
    /// that ranked only some labels still counts for the labels it ranked,
    /// and the omitted labels receive 0 points from that judge. Models with
    /// no label (Stage-1 failures) are absent from the ranking entirely.
    pub fn from_submissions(
        submissions: &[RankingSubmission],
        map: &LabelMap,
        rule: &ScoringRule,
    ) -> Self {
        let mut entries: Vec<ModelScore> = map
            .iter()
            .map(|(_, model)| ModelScore {
                model: model.clone(),
                score: 0.0,
                first_place_votes: 0,
            })
            .collect();

        for submission in submissions.iter().filter(|s| s.is_ranked()) {
            let ranked_count = submission.ordered_labels.len();
            let mut seen = HashSet::new();
            for (position, label) in submission.ordered_labels.iter().enumerate() {
                if !seen.insert(label) {
                    continue;
                }
                let Some(model) = map.model_for(label) else {
                    continue;
                };
                if let Some(entry) = entries.iter_mut().find(|e| &e.model == model) {
                    entry.score += rule.points(position, ranked_count);
                    if position == 0 {
                        entry.first_place_votes += 1;
                    }
                }
            }
        }

        entries.sort_by(Self::standing_order);
        Self { entries }
    }

    /// Descending score, then descending first-place votes, then ascending
    /// model identifier. Total order, stable across runs.
    fn standing_order(a: &ModelScore, b: &ModelScore) -> Ordering {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.first_place_votes.cmp(&a.first_place_votes))
            .then_with(|| a.model.as_str().cmp(b.model.as_str()))
    }

    /// Entries best-first.
    pub fn entries(&self) -> &[ModelScore] {
        &self.entries
    }

    /// The consensus winner, if any model was ranked.
    pub fn winner(&self) -> Option<&ModelScore> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
