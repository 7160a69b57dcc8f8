//! Generate Title use case
//!
//! Derives a short conversation title from the first user message. Runs
//! beside the council pipeline and is strictly best-effort: any failure
//! falls back to the default placeholder title.

use crate::ports::model_gateway::ModelGateway;
use council_domain::core::string::truncate;
use council_domain::{Message, Model, PromptTemplate, DEFAULT_TITLE};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Longest title kept, in bytes.
const MAX_TITLE_LEN: usize = 60;

/// Use case for generating a conversation title
pub struct GenerateTitleUseCase<G: ModelGateway + 'static> {
    gateway: Arc<G>,
}

impl<G: ModelGateway + 'static> GenerateTitleUseCase<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Ask `model` for a title. Never fails: gateway errors and unusable
    /// replies yield [`DEFAULT_TITLE`].
    pub async fn execute(&self, first_message: &str, model: &Model, timeout: Duration) -> String {
        let messages = vec![Message::user(PromptTemplate::title_prompt(first_message))];

        match self.gateway.invoke(model, &messages, timeout).await {
            Ok(reply) => {
                let title = clean_title(&reply);
                if title.is_empty() {
                    DEFAULT_TITLE.to_string()
                } else {
                    debug!("Generated conversation title: {}", title);
                    title
                }
            }
            Err(e) => {
                warn!("Title generation failed, keeping default: {}", e);
                DEFAULT_TITLE.to_string()
            }
        }
    }
}

/// Normalize a model's title reply: first line only, wrapping quotes and
/// trailing period stripped, length bounded.
fn clean_title(reply: &str) -> String {
    let line = reply.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let trimmed = line
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '\u{201c}' || c == '\u{201d}')
        .trim_end_matches('.')
        .trim();
    truncate(trimmed, MAX_TITLE_LEN)
}
