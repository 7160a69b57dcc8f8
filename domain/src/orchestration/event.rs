//! Stage progress events for incremental delivery.
//!
//! A turn's event stream is strictly ordered: each stage's `*Start` precedes
//! its `*Complete`, and no stage starts before its predecessor completes.
//! `TitleReady` is the one out-of-band event: title generation runs beside
//! the pipeline and reports whenever it finishes.

use super::value_objects::{CouncilTurn, PartialTurn, Stage1Result, Stage2Result, SynthesisResult};
use crate::council::aggregate::AggregateRanking;
use serde::{Deserialize, Serialize};

/// An event in a streaming council turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    Stage1Start,
    Stage1Complete {
        stage1: Stage1Result,
    },
    Stage2Start,
    Stage2Complete {
        stage2: Stage2Result,
        aggregate: AggregateRanking,
    },
    Stage3Start,
    Stage3Complete {
        stage3: SynthesisResult,
    },
    /// Out-of-band: the conversation title finished generating.
    TitleReady {
        title: String,
    },
    /// Terminal: the full turn bundle.
    Complete {
        turn: CouncilTurn,
    },
    /// Terminal: the turn failed; whatever stage data existed is attached.
    Error {
        message: String,
        partial: PartialTurn,
    },
}

impl TurnEvent {
    /// Returns true if this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnEvent::Complete { .. } | TurnEvent::Error { .. })
    }

    /// Event type tag as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            TurnEvent::Stage1Start => "stage1_start",
            TurnEvent::Stage1Complete { .. } => "stage1_complete",
            TurnEvent::Stage2Start => "stage2_start",
            TurnEvent::Stage2Complete { .. } => "stage2_complete",
            TurnEvent::Stage3Start => "stage3_start",
            TurnEvent::Stage3Complete { .. } => "stage3_complete",
            TurnEvent::TitleReady { .. } => "title_ready",
            TurnEvent::Complete { .. } => "complete",
            TurnEvent::Error { .. } => "error",
        }
    }
}
