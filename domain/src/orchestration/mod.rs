//! Turn orchestration types: stages, configuration, results, and events.

pub mod entities;
pub mod event;
pub mod state;
pub mod value_objects;

pub use entities::{CouncilConfig, Stage};
pub use event::TurnEvent;
pub use state::{TurnPhase, TurnState};
pub use value_objects::{
    CouncilTurn, ModelResponse, PartialTurn, Stage1Result, Stage2Result, SynthesisResult,
};
