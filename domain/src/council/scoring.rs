//! Rank-to-score weighting rules.
//!
//! The scoring law is the one seam product requirements are most likely to
//! change, so it lives behind an enum that aggregation takes as a parameter.

use serde::{Deserialize, Serialize};

/// How a label's rank position converts into points for the model behind it.
///
/// # Example
///
/// ```
/// use council_domain::council::ScoringRule;
///
/// let rule = ScoringRule::InverseRank;
/// // A judge ranked 3 labels: first gets 3 points, last gets 1.
/// assert_eq!(rule.points(0, 3), 3.0);
/// assert_eq!(rule.points(2, 3), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringRule {
    /// First place earns as many points as the judge ranked labels, last
    /// place earns 1. Judges ranking fewer labels hand out fewer points.
    InverseRank,
    /// Classic Borda count against a fixed council size, so partial
    /// rankings still award first place the same weight.
    Borda { council_size: usize },
}

impl ScoringRule {
    /// Points awarded for `position` (0-based, best first) in a ranking of
    /// `ranked_count` labels. Labels a judge omitted score 0 by construction
    /// (they have no position).
    pub fn points(&self, position: usize, ranked_count: usize) -> f64 {
        match self {
            ScoringRule::InverseRank => ranked_count.saturating_sub(position) as f64,
            ScoringRule::Borda { council_size } => {
                council_size.saturating_sub(position) as f64
            }
        }
    }
}

impl Default for ScoringRule {
    fn default() -> Self {
        ScoringRule::InverseRank
    }
}

impl std::fmt::Display for ScoringRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringRule::InverseRank => write!(f, "inverse-rank"),
            ScoringRule::Borda { council_size } => write!(f, "borda:{}", council_size),
        }
    }
}

impl std::str::FromStr for ScoringRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("inverse-rank") || s.eq_ignore_ascii_case("inverse_rank") {
            return Ok(ScoringRule::InverseRank);
        }
        if let Some(n) = s.strip_prefix("borda:") {
            let council_size = n
                .parse()
                .map_err(|_| format!("invalid borda council size: {}", n))?;
            return Ok(ScoringRule::Borda { council_size });
        }
        Err(format!("unknown scoring rule: {}", s))
    }
}
