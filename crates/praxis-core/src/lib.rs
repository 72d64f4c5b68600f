//! Praxis Core - Multi-Role Pipeline Engine
//!
//! This crate provides the task execution pipeline for Praxis:
//! - Roles: Planner/Coder/Tester prompt, retry, and enrichment strategies
//! - Steps: Deterministic, immutable step plans computed before execution
//! - Ledger: Crash-safe progress records with best-effort fan-out
//! - Event bus: Per-task broadcast of progress events
//! - Orchestrator: The sequential pipeline state machine
//!
//! The reliability contract throughout: every status transition is
//! persisted before anyone is notified of it, and no single agent failure
//! aborts a pipeline.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod event_bus;
pub mod ledger;
pub mod orchestrator;
pub mod roles;
pub mod steps;
pub mod types;

pub use context::AgentContext;
pub use error::{Error, Result};
pub use event_bus::TaskEventBus;
pub use ledger::{
    MemoryProgressStore, ProgressEvent, ProgressLedger, ProgressRecord, ProgressStore,
    SqliteProgressStore, StepStatus,
};
pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use roles::{AgentRole, CoderRole, PlannerRole, RoleFactory, TesterRole};
pub use steps::{
    step_id, PreGeneratedStep, StepAgentContext, StepPhase, StepPlanConfig, StepPlanGenerator,
    StepType, StepsPlan,
};
pub use types::{
    AgentDefinition, Enrichment, ExecutionResult, MultiAgentResponse, RoleKind, TaskInput,
    TestResults,
};
