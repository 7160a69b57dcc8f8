//! Domain error types and the model-invocation failure taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a failed model invocation.
///
/// Per-model failures in Stage 1 and Stage 2 are recorded with their kind
/// rather than raised, so a turn can degrade gracefully and callers can
/// still distinguish a timeout from a provider rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The invocation exceeded its deadline.
    Timeout,
    /// The gateway endpoint could not be reached.
    Unreachable,
    /// The provider returned a non-2xx status.
    Upstream,
    /// The reply could not be used (unparseable ranking, empty text).
    Malformed,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Unreachable => "unreachable",
            FailureKind::Upstream => "upstream",
            FailureKind::Malformed => "malformed",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded model-invocation failure: kind plus human-readable detail.
///
/// For `Upstream` failures the provider status code is kept alongside the
/// (truncated) response body in `detail`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub detail: String,
}

impl Failure {
    pub fn timeout() -> Self {
        Self {
            kind: FailureKind::Timeout,
            status: None,
            detail: "request timed out".to_string(),
        }
    }

    pub fn unreachable(detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Unreachable,
            status: None,
            detail: detail.into(),
        }
    }

    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Upstream,
            status: Some(status),
            detail: body.into(),
        }
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Malformed,
            status: None,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({}): {}", self.kind, status, self.detail),
            None => write!(f, "{}: {}", self.kind, self.detail),
        }
    }
}

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("No models configured for the council")]
    NoMembers,

    #[error("No council responses")]
    NoResponses,

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Invalid stage transition: {0}")]
    InvalidTransition(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display() {
        let f = Failure::upstream(503, "overloaded");
        assert_eq!(f.to_string(), "upstream (503): overloaded");

        let t = Failure::timeout();
        assert_eq!(t.to_string(), "timeout: request timed out");
    }

    #[test]
    fn test_failure_serde_roundtrip() {
        let f = Failure::malformed("no recognized labels");
        let json = serde_json::to_string(&f).unwrap();
        let back: Failure = serde_json::from_str(&json).unwrap();
        assert_eq!(f, back);
        assert!(!json.contains("status"));
    }

    #[test]
    fn test_is_cancelled_check() {
        assert!(DomainError::Cancelled.is_cancelled());
        assert!(!DomainError::NoMembers.is_cancelled());
        assert!(!DomainError::NoResponses.is_cancelled());
    }
}
