//! Planner role - produces the implementation plan

use tracing::debug;

use super::extraction;
use super::{format_attempts, AgentRole, ROLE_HISTORY_CAP};
use crate::context::AgentContext;
use crate::types::{AgentDefinition, Enrichment, ExecutionResult, RoleKind};

/// First pipeline position: turns the task description into a plan with
/// explicit testing-feasibility and file/dependency sections.
///
/// Sees only its own prior attempts (last two); nothing upstream exists
/// yet, and downstream output would be noise.
#[derive(Debug, Clone)]
pub struct PlannerRole {
    max_retries: u32,
}

impl PlannerRole {
    /// Create a planner with the default retry budget
    #[must_use]
    pub fn new() -> Self {
        Self { max_retries: 1 }
    }

    /// Override the retry budget
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

impl Default for PlannerRole {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentRole for PlannerRole {
    fn kind(&self) -> RoleKind {
        RoleKind::Planner
    }

    fn create_prompt(
        &self,
        task: &str,
        context: &AgentContext,
        _definition: &AgentDefinition,
    ) -> String {
        let history = format_attempts(
            "Previous Planning Attempts",
            &context.last_attempts_for(RoleKind::Planner, ROLE_HISTORY_CAP),
        );

        format!(
            "You are the planning agent in an automated development pipeline.\n\
             \n\
             ## Task\n\
             {task}\n\
             \n\
             ## Working Directory\n\
             {work_dir}\n\
             \n\
             ## Instructions\n\
             Produce an implementation plan for the task. The plan must contain:\n\
             - a Files and Dependencies section listing every file to create or \
             modify and the dependencies involved\n\
             - a Testing Strategy section with an explicit assessment of whether \
             the change is feasible to test, and how\n\
             - implementation steps in the order a coder should take them\n\
             \n\
             Be concrete: name files, name functions, name commands.\
             {history}",
            work_dir = context.work_dir().display(),
        )
    }

    fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn post_execution_hook(
        &self,
        result: ExecutionResult,
        _context: &AgentContext,
    ) -> ExecutionResult {
        let enrichment = Enrichment {
            files_mentioned: extraction::files_mentioned(&result.output),
            technologies: extraction::technologies(&result.output),
            ..Enrichment::default()
        };
        if enrichment.is_empty() {
            debug!(agent_id = %result.agent_id, "planner enrichment found nothing");
            return result;
        }
        result.with_enrichment(enrichment)
    }
}
