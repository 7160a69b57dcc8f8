//! Core domain types shared across the council pipeline.

pub mod error;
pub mod model;
pub mod question;
pub mod string;

pub use error::{DomainError, Failure, FailureKind};
pub use model::Model;
pub use question::Question;
