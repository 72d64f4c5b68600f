//! Pre-generated step plans
//!
//! The plan for a task is derived from the agent-definition list alone,
//! before anything executes. It is the source of truth for valid step ids
//! (the ledger drops events for ids it does not contain), the total step
//! count for progress math, and the duration estimate.

mod generator;
mod plan;

pub use generator::{StepPlanConfig, StepPlanGenerator};
pub use plan::{step_id, PreGeneratedStep, StepAgentContext, StepPhase, StepType, StepsPlan};
