//! Pipeline roles
//!
//! Each role is a strategy object governing prompt construction, retry
//! policy, and post-processing for one pipeline position. Context
//! injection is role-scoped: a role receives exactly the upstream output
//! relevant to it, which bounds prompt growth and keeps cross-role noise
//! out. Same-role retry history is capped at two attempts.

pub mod extraction;
mod factory;

mod coder;
mod planner;
mod tester;


pub use coder::CoderRole;
pub use factory::RoleFactory;
pub use planner::PlannerRole;
pub use tester::TesterRole;

use crate::context::AgentContext;
use crate::types::{AgentDefinition, ExecutionResult, RoleKind};

/// How many same-role attempts a prompt may look back on
pub const ROLE_HISTORY_CAP: usize = 2;

/// Strategy governing one pipeline position.
///
/// Implementations must be cheap to construct; the factory builds a fresh
/// instance per dispatch.
pub trait AgentRole: Send + Sync + std::fmt::Debug {
    /// Which role this strategy implements
    fn kind(&self) -> RoleKind;

    /// Build the prompt for this position from the task and the
    /// role-scoped slice of accumulated context. Called once per agent;
    /// retries reuse the same prompt.
    fn create_prompt(
        &self,
        task: &str,
        context: &AgentContext,
        definition: &AgentDefinition,
    ) -> String;

    /// Number of retries allowed after the first attempt
    fn max_retries(&self) -> u32;

    /// Whether a failed attempt should be retried at all
    fn should_retry(&self) -> bool {
        true
    }

    /// Best-effort enrichment over the attempt's free-text output.
    ///
    /// Must never fail: whatever the heuristics cannot find is simply
    /// absent, and the original result comes back unannotated.
    fn post_execution_hook(
        &self,
        result: ExecutionResult,
        context: &AgentContext,
    ) -> ExecutionResult;
}

/// Render prior same-role attempts as a prompt section.
///
/// Empty history renders nothing; failed attempts show their error text so
/// a later pass knows what went wrong.
fn format_attempts(title: &str, attempts: &[&ExecutionResult]) -> String {
    if attempts.is_empty() {
        return String::new();
    }
    let body = attempts
        .iter()
        .map(|r| {
            if r.success {
                format!("### Attempt {} (succeeded)\n{}", r.attempt, r.output)
            } else {
                format!(
                    "### Attempt {} (failed)\n{}",
                    r.attempt,
                    r.error.as_deref().unwrap_or("unknown error")
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("\n\n---\n## {title}\n{body}")
}
