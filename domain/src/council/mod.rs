//! Council deliberation domain
//!
//! This module contains the core concepts for anonymous peer ranking:
//!
//! - **Labels**: each successful Stage-1 answer is shown to the judges under
//!   an opaque positional label so no judge can recognize a competitor (or
//!   itself) by name.
//! - **Submissions**: each judge's preference order over the labels, parsed
//!   tolerantly from free-form text.
//! - **Aggregation**: submissions plus the private label→model map produce a
//!   single deterministic consensus ranking over models.

pub mod aggregate;
pub mod label;
pub mod parsing;
pub mod scoring;
pub mod submission;

// Re-export main types
pub use aggregate::{AggregateRanking, ModelScore};
pub use label::{anonymize, AnonymousAnswer, Label, LabelMap};
pub use parsing::{parse_ranking, RankingParseError};
pub use scoring::ScoringRule;
pub use submission::RankingSubmission;
