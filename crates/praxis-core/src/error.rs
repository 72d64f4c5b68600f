//! Error types for praxis-core
//!
//! Pre-flight validation failures surface synchronously before any step
//! executes; persistence failures are the one class that is fatal to a
//! progress update. Everything that happens *inside* a step is recovered
//! into a failed `ExecutionResult` and never reaches this enum.

use thiserror::Error;

use crate::types::RoleKind;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Two agent definitions in one task share a role
    #[error("duplicate role in task: {role}")]
    DuplicateRole {
        /// The role that appears more than once
        role: RoleKind,
    },

    /// A role has no registered constructor in the factory
    #[error("unsupported role: {role}")]
    UnsupportedRole {
        /// The role name that failed to resolve
        role: String,
    },

    /// The task input is malformed (empty agent list, blank description)
    #[error("invalid task: {0}")]
    InvalidTask(String),

    /// A durability write failed; crash recovery would be broken
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
