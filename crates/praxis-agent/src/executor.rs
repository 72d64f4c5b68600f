//! Executor - the `execute(request) -> outcome` capability
//!
//! The pipeline treats the thing that actually does the work (an AI CLI,
//! an IDE automation, a bare HTTP API) as a single async call. Everything
//! an implementation needs is on the request; in particular the working
//! directory travels as an explicit resolved path so implementations never
//! have to mutate process-wide state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;

/// One agent invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Fully assembled prompt text
    pub prompt: String,
    /// Model identifier the caller wants this invocation to use
    pub model: String,
    /// Resolved working directory for the invocation
    pub work_dir: PathBuf,
    /// Per-invocation time budget
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl ExecutionRequest {
    /// Create a new request with the default timeout
    #[must_use]
    pub fn new(prompt: impl Into<String>, model: impl Into<String>, work_dir: PathBuf) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            work_dir,
            timeout: Duration::from_secs(300),
        }
    }

    /// Set the per-invocation timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// What came back from one agent invocation.
///
/// `success: false` with an `Ok` return is the normal way for a backend to
/// report "I ran, but the work failed"; `Err` from `execute` is reserved
/// for the invocation itself breaking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentOutcome {
    /// Whether the backend considers the work done
    pub success: bool,
    /// Output text produced by the agent
    pub content: String,
    /// Error description when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentOutcome {
    /// Successful outcome with content
    #[must_use]
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
            error: None,
        }
    }

    /// Failed outcome with an error description
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            content: String::new(),
            error: Some(error.into()),
        }
    }
}

/// The external agent capability.
///
/// Implementations must be safe to share across tasks (`Arc<dyn AgentExecutor>`)
/// and must not rely on process-wide working-directory state; the request
/// carries the resolved path.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    /// Human-readable backend name (for logging)
    fn name(&self) -> &str;

    /// Run one invocation to completion
    async fn execute(&self, request: ExecutionRequest) -> Result<AgentOutcome>;
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_constructors() {
        let ok = AgentOutcome::ok("done");
        assert!(ok.success);
        assert_eq!(ok.content, "done");
        assert!(ok.error.is_none());

        let failed = AgentOutcome::failed("boom");
        assert!(!failed.success);
        assert!(failed.content.is_empty());
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_request_serialization_roundtrip() {
        let request = ExecutionRequest::new("do it", "sonnet-4", PathBuf::from("/tmp/w"))
            .with_timeout(Duration::from_secs(42));
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"timeout\":42"));
        let parsed: ExecutionRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.timeout, Duration::from_secs(42));
        assert_eq!(parsed.model, "sonnet-4");
    }
}
