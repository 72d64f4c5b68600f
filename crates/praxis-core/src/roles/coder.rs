//! Coder role - implements the plan

use tracing::debug;

use super::extraction;
use super::{format_attempts, AgentRole, ROLE_HISTORY_CAP};
use crate::context::AgentContext;
use crate::types::{AgentDefinition, Enrichment, ExecutionResult, RoleKind};

/// Second pipeline position: turns the latest Planner output into code.
///
/// Sees the latest successful Planner output plus its own last two
/// attempts. Tester output is deliberately excluded.
#[derive(Debug, Clone)]
pub struct CoderRole {
    max_retries: u32,
}

impl CoderRole {
    /// Create a coder with the default retry budget
    #[must_use]
    pub fn new() -> Self {
        Self { max_retries: 2 }
    }

    /// Override the retry budget
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

impl Default for CoderRole {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentRole for CoderRole {
    fn kind(&self) -> RoleKind {
        RoleKind::Coder
    }

    fn create_prompt(
        &self,
        task: &str,
        context: &AgentContext,
        _definition: &AgentDefinition,
    ) -> String {
        let plan_section = match context.latest_output_for(RoleKind::Planner) {
            Some(plan) => format!("\n\n---\n## Implementation Plan\n{}", plan.output),
            None => String::new(),
        };
        let history = format_attempts(
            "Previous Coding Attempts",
            &context.last_attempts_for(RoleKind::Coder, ROLE_HISTORY_CAP),
        );

        format!(
            "You are the coding agent in an automated development pipeline.\n\
             \n\
             ## Task\n\
             {task}\n\
             \n\
             ## Working Directory\n\
             {work_dir}\n\
             \n\
             ## Instructions\n\
             Implement the task, following the implementation plan when one is \
             provided. Match the existing code conventions of the repository: \
             naming, error handling, formatting, and module layout. State which \
             files you created or modified.\
             {plan_section}{history}",
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
            debug!(agent_id = %result.agent_id, "coder enrichment found nothing");
            return result;
        }
        result.with_enrichment(enrichment)
    }
}
