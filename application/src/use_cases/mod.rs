//! Use cases orchestrating the council pipeline.

pub mod fanout;
pub mod generate_title;
pub mod run_council;

pub use fanout::settle_all;
pub use generate_title::GenerateTitleUseCase;
pub use run_council::{RunCouncilError, RunCouncilInput, RunCouncilUseCase, TurnContext};
