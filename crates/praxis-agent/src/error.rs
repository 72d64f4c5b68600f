//! Error types for praxis-agent

use thiserror::Error;

/// Agent capability error type
#[derive(Debug, Error)]
pub enum Error {
    /// The executor backend is not available (not installed, not logged in)
    #[error("executor unavailable: {0}")]
    Unavailable(String),

    /// The invocation itself failed (process died, connection dropped)
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The invocation exceeded its time budget
    #[error("execution timed out after {0}s")]
    Timeout(u64),

    /// The backend returned something the executor could not interpret
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
