//! Execution control parameters for a council turn.

use std::time::Duration;

/// Default deadline for one council/chairman invocation.
const DEFAULT_INVOKE_TIMEOUT: Duration = Duration::from_secs(120);

/// Default deadline for the lightweight title invocation.
const DEFAULT_TITLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeouts applied to model invocations.
///
/// Every invocation carries a bounded timeout so a hung provider converts
/// into a recorded failure instead of stalling a fan-out barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionParams {
    invoke_timeout: Duration,
    title_timeout: Duration,
}

impl ExecutionParams {
    pub fn new(invoke_timeout: Duration, title_timeout: Duration) -> Self {
        Self {
            invoke_timeout,
            title_timeout,
        }
    }

    pub fn with_invoke_timeout(mut self, timeout: Duration) -> Self {
        self.invoke_timeout = timeout;
        self
    }

    pub fn with_title_timeout(mut self, timeout: Duration) -> Self {
        self.title_timeout = timeout;
        self
    }

    /// Deadline for Stage 1/2/3 invocations.
    pub fn invoke_timeout(&self) -> Duration {
        self.invoke_timeout
    }

    /// Deadline for the title invocation.
    pub fn title_timeout(&self) -> Duration {
        self.title_timeout
    }
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            invoke_timeout: DEFAULT_INVOKE_TIMEOUT,
            title_timeout: DEFAULT_TITLE_TIMEOUT,
        }
    }
}
