//! Anonymous labels for peer ranking.
//!
//! During Stage 2 each successful Stage-1 answer is shown to the judges
//! under an opaque label ("Response A", "Response B", ...) so that no judge
//! can recognize itself or a competitor by name. The label→model mapping
//! stays inside the orchestrator and is only consulted when converting
//! label rankings back into model rankings.

use crate::core::model::Model;
use crate::orchestration::value_objects::ModelResponse;
use serde::{Deserialize, Serialize};

/// An opaque token standing in for one model's answer (Value Object).
///
/// Labels are assigned positionally over the successful-response list, never
/// derived from the model identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// The label for the `index`-th successful response: "Response A",
    /// "Response B", ... continuing with "Response AA" past 26 entries.
    pub fn nth(index: usize) -> Self {
        let mut name = String::new();
        let mut n = index;
        loop {
            name.insert(0, (b'A' + (n % 26) as u8) as char);
            if n < 26 {
                break;
            }
            n = n / 26 - 1;
        }
        Label(format!("Response {}", name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One Stage-1 answer under its anonymous label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymousAnswer {
    pub label: Label,
    pub text: String,
}

/// The label→model mapping for one council turn.
///
/// Built once when Stage 2 begins and read-only thereafter. It is never
/// shown to the models; only the aggregator uses it to attribute scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelMap {
    entries: Vec<LabelEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LabelEntry {
    label: Label,
    model: Model,
}

impl LabelMap {
    /// Assign labels positionally over the successful subset of a Stage-1
    /// result set, in the order given (council configuration order).
    ///
    /// A pure function: the same response list always yields the same map.
    pub fn assign(responses: &[ModelResponse]) -> Self {
        let entries = responses
            .iter()
            .filter(|r| r.is_success())
            .enumerate()
            .map(|(i, r)| LabelEntry {
                label: Label::nth(i),
                model: r.model.clone(),
            })
            .collect();
        Self { entries }
    }

    /// Look up the model behind a label.
    pub fn model_for(&self, label: &Label) -> Option<&Model> {
        self.entries
            .iter()
            .find(|e| &e.label == label)
            .map(|e| &e.model)
    }

    /// Whether the label was assigned in this turn.
    pub fn contains(&self, label: &Label) -> bool {
        self.model_for(label).is_some()
    }

    /// Labels in assignment order.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.entries.iter().map(|e| &e.label)
    }

    /// (label, model) pairs in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&Label, &Model)> {
        self.entries.iter().map(|e| (&e.label, &e.model))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Anonymize the successful subset of a Stage-1 result set.
///
/// Returns the (label, text) pairs to show the judges, in label order, plus
/// the private [`LabelMap`]. Failed responses carry no label; a model that
/// produced nothing cannot be ranked.
pub fn anonymize(responses: &[ModelResponse]) -> (Vec<AnonymousAnswer>, LabelMap) {
    let answers = responses
        .iter()
        .filter(|r| r.is_success())
        .enumerate()
        .map(|(i, r)| AnonymousAnswer {
            label: Label::nth(i),
            text: r.text.clone().unwrap_or_default(),
        })
        .collect();
    (answers, LabelMap::assign(responses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Failure;

    fn stage1() -> Vec<ModelResponse> {
        vec![
            ModelResponse::success(Model::Gpt4o, "answer one"),
            ModelResponse::failure(Model::Gemini20Flash, Failure::timeout()),
            ModelResponse::success(Model::ClaudeSonnet45, "answer three"),
        ]
    }

    #[test]
    fn test_label_sequence() {
        assert_eq!(Label::nth(0).as_str(), "Response A");
        assert_eq!(Label::nth(1).as_str(), "Response B");
        assert_eq!(Label::nth(25).as_str(), "Response Z");
        assert_eq!(Label::nth(26).as_str(), "Response AA");
    }

    #[test]
    fn test_assign_skips_failures() {
        let map = LabelMap::assign(&stage1());
        assert_eq!(map.len(), 2);
        assert_eq!(map.model_for(&Label::nth(0)), Some(&Model::Gpt4o));
        assert_eq!(map.model_for(&Label::nth(1)), Some(&Model::ClaudeSonnet45));
        assert!(!map.contains(&Label::nth(2)));
    }

    #[test]
    fn test_assign_is_pure() {
        let responses = stage1();
        assert_eq!(LabelMap::assign(&responses), LabelMap::assign(&responses));
    }

    #[test]
    fn test_labels_not_derived_from_identity() {
        // Reordering the council reassigns labels positionally: the same
        // model gets a different label when its position changes.
        let forward = stage1();
        let mut reversed = stage1();
        reversed.reverse();

        let map_a = LabelMap::assign(&forward);
        let map_b = LabelMap::assign(&reversed);
        assert_eq!(map_a.model_for(&Label::nth(0)), Some(&Model::Gpt4o));
        assert_eq!(map_b.model_for(&Label::nth(0)), Some(&Model::ClaudeSonnet45));
    }

    #[test]
    fn test_anonymize_pairs_follow_label_order() {
        let (answers, map) = anonymize(&stage1());
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].label, Label::nth(0));
        assert_eq!(answers[0].text, "answer one");
        assert_eq!(answers[1].text, "answer three");
        assert_eq!(map.len(), 2);
    }
}
