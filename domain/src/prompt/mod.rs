//! Prompt construction for each pipeline stage.

pub mod template;

pub use template::PromptTemplate;
