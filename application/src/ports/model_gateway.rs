//! Model gateway port
//!
//! Defines the interface for sending one chat completion request to one
//! named model. The adapter (infrastructure layer) handles provider routing
//! and auth; this port is deliberately retry-free since retry policy belongs to
//! the collectors, because stages tolerate failure differently.

use async_trait::async_trait;
use council_domain::{Failure, Message, Model};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a model invocation
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("request timed out")]
    Timeout,

    #[error("gateway unreachable: {0}")]
    Unreachable(String),

    #[error("upstream error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("malformed gateway response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Convert into the domain failure record stored on a per-model result.
    pub fn into_failure(self) -> Failure {
        match self {
            GatewayError::Timeout => Failure::timeout(),
            GatewayError::Unreachable(detail) => Failure::unreachable(detail),
            GatewayError::Upstream { status, body } => Failure::upstream(status, body),
            GatewayError::Malformed(detail) => Failure::malformed(detail),
        }
    }
}

/// Gateway for model invocations
///
/// This port defines how the application layer reaches LLM providers.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Send one chat prompt to one named model and return its reply text.
    ///
    /// `messages` is the ordered role-tagged prompt context. The invocation
    /// must settle within `timeout`; exceeding it is a [`GatewayError::Timeout`].
    async fn invoke(
        &self,
        model: &Model,
        messages: &[Message],
        timeout: Duration,
    ) -> Result<String, GatewayError>;
}
