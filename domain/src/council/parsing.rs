//! Ranking response parsing for Stage 2.
//!
//! Judges reply in free form; these functions extract an ordered label
//! sequence from the reply. Pure domain logic: no I/O, no session
//! management, just text pattern matching.
//!
//! The parser is deliberately tolerant: recognized label tokens are taken
//! in order of first appearance, unknown tokens are discarded, and only a
//! reply with zero recognized labels counts as malformed.

use super::label::{Label, LabelMap};
use thiserror::Error;

/// Marker judges are asked to put before their ordered list.
const RANKING_MARKER: &str = "FINAL RANKING";

/// Errors from ranking extraction
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RankingParseError {
    #[error("no recognized labels in reply")]
    NoLabels,
}

/// Extract a judge's label ranking from its free-form reply.
///
/// If the reply contains a `FINAL RANKING` marker, only the text after the
/// last marker is scanned; otherwise the whole reply is scanned. Each known
/// label contributes its first occurrence position; the result is the known
/// labels sorted by that position. Matching is case-insensitive and ignores
/// tokens embedded in longer words ("Response AB" does not match
/// "Response A").
pub fn parse_ranking(reply: &str, map: &LabelMap) -> Result<Vec<Label>, RankingParseError> {
    let lower = reply.to_lowercase();

    let section_start = lower.rfind(&RANKING_MARKER.to_lowercase());
    if let Some(start) = section_start {
        let ranked = labels_in_order(&lower[start..], map);
        if !ranked.is_empty() {
            return Ok(ranked);
        }
        // Marker present but no labels after it; fall through to the
        // whole reply rather than failing outright.
    }

    let ranked = labels_in_order(&lower, map);
    if ranked.is_empty() {
        return Err(RankingParseError::NoLabels);
    }
    Ok(ranked)
}

/// Known labels ordered by first occurrence in `haystack` (lowercased).
fn labels_in_order(haystack: &str, map: &LabelMap) -> Vec<Label> {
    let mut found: Vec<(usize, Label)> = map
        .labels()
        .filter_map(|label| {
            find_token(haystack, &label.as_str().to_lowercase()).map(|pos| (pos, label.clone()))
        })
        .collect();
    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, label)| label).collect()
}

/// First occurrence of `token` in `haystack` that is not a prefix of a
/// longer alphanumeric token ("response a" must not match "response ab").
fn find_token(haystack: &str, token: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = haystack[from..].find(token) {
        let pos = from + rel;
        let after = haystack[pos + token.len()..].chars().next();
        if !after.is_some_and(|c| c.is_ascii_alphanumeric()) {
            return Some(pos);
        }
        from = pos + token.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Failure;
    use crate::core::model::Model;
    use crate::orchestration::value_objects::ModelResponse;

    fn three_label_map() -> LabelMap {
        LabelMap::assign(&[
            ModelResponse::success(Model::Gpt4o, "a1"),
            ModelResponse::success(Model::Gemini20Flash, "a2"),
            ModelResponse::success(Model::ClaudeSonnet45, "a3"),
        ])
    }

    #[test]
    fn test_parse_marker_section() {
        let map = three_label_map();
        let reply = "Response A is thorough but Response C is sharper.\n\n\
                     FINAL RANKING:\n1. Response C\n2. Response A\n3. Response B";
        let ranked = parse_ranking(reply, &map).unwrap();
        assert_eq!(ranked, vec![Label::nth(2), Label::nth(0), Label::nth(1)]);
    }

    #[test]
    fn test_parse_without_marker_uses_appearance_order() {
        let map = three_label_map();
        let reply = "Best is Response B, then Response A. Response C trails.";
        let ranked = parse_ranking(reply, &map).unwrap();
        assert_eq!(ranked, vec![Label::nth(1), Label::nth(0), Label::nth(2)]);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let map = three_label_map();
        let ranked = parse_ranking("final ranking: 1) response b 2) response a", &map).unwrap();
        assert_eq!(ranked, vec![Label::nth(1), Label::nth(0)]);
    }

    #[test]
    fn test_parse_partial_ranking() {
        let map = three_label_map();
        // Judge only ranked two of the three labels; accepted as-is.
        let ranked = parse_ranking("FINAL RANKING:\n1. Response A\n2. Response C", &map).unwrap();
        assert_eq!(ranked, vec![Label::nth(0), Label::nth(2)]);
    }

    #[test]
    fn test_unknown_labels_discarded() {
        let map = three_label_map();
        let reply = "FINAL RANKING:\n1. Response D\n2. Response B";
        let ranked = parse_ranking(reply, &map).unwrap();
        assert_eq!(ranked, vec![Label::nth(1)]);
    }

    #[test]
    fn test_no_labels_is_malformed() {
        let map = three_label_map();
        assert_eq!(
            parse_ranking("I cannot rank these.", &map),
            Err(RankingParseError::NoLabels)
        );
        assert_eq!(parse_ranking("", &map), Err(RankingParseError::NoLabels));
    }

    #[test]
    fn test_duplicate_mentions_keep_first_position() {
        let map = three_label_map();
        let reply = "FINAL RANKING:\n1. Response B\n2. Response A\n3. Response B";
        let ranked = parse_ranking(reply, &map).unwrap();
        assert_eq!(ranked, vec![Label::nth(1), Label::nth(0)]);
    }

    #[test]
    fn test_label_prefix_does_not_match_longer_label() {
        // 27 successful responses produce "Response AA"; "Response A" must
        // match only itself.
        let responses: Vec<ModelResponse> = (0..27)
            .map(|i| ModelResponse::success(Model::Custom(format!("m{}", i)), "x"))
            .collect();
        let map = LabelMap::assign(&responses);
        let ranked = parse_ranking("FINAL RANKING: 1. Response AA", &map).unwrap();
        assert_eq!(ranked, vec![Label::nth(26)]);
    }

    #[test]
    fn test_marker_with_no_labels_falls_back_to_body() {
        let map = three_label_map();
        let reply = "Response A was best overall.\nFINAL RANKING: (see above)";
        let ranked = parse_ranking(reply, &map).unwrap();
        assert_eq!(ranked, vec![Label::nth(0)]);
    }

    // keep the parse failure composable with the submission type
    #[test]
    fn test_malformed_maps_to_failure() {
        let err = RankingParseError::NoLabels;
        let failure = Failure::malformed(err.to_string());
        assert_eq!(failure.detail, "no recognized labels in reply");
    }
}
