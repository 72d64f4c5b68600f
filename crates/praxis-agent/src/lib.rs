//! Praxis Agent - Agent Capability Abstraction
//!
//! This crate defines the single capability the Praxis pipeline consumes
//! from the outside world: `execute(request) -> outcome`. Concrete
//! implementations (IDE-driven, browser-driven, API-driven) live behind
//! the `AgentExecutor` trait and are interchangeable.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod executor;

pub use error::{Error, Result};
pub use executor::{AgentExecutor, AgentOutcome, ExecutionRequest};
