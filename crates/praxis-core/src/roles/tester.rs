//! Tester role - verifies the implementation

use tracing::debug;

use super::extraction;
use super::{format_attempts, AgentRole, ROLE_HISTORY_CAP};
use crate::context::AgentContext;
use crate::types::{AgentDefinition, Enrichment, ExecutionResult, RoleKind};

/// Final pipeline position: verifies what the coder produced.
///
/// Sees the Planner's testing-strategy excerpt, *all* Coder outputs (a
/// partial fix in attempt one may matter even when attempt two succeeded),
/// and its own last two attempts.
#[derive(Debug, Clone)]
pub struct TesterRole {
    max_retries: u32,
}

impl TesterRole {
    /// Create a tester with the default retry budget
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

impl Default for TesterRole {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentRole for TesterRole {
    fn kind(&self) -> RoleKind {
        RoleKind::Tester
    }

    fn create_prompt(
        &self,
        task: &str,
        context: &AgentContext,
        _definition: &AgentDefinition,
    ) -> String {
        let strategy_section = context
            .latest_output_for(RoleKind::Planner)
            .and_then(|plan| extraction::testing_strategy_excerpt(&plan.output))
            .map(|excerpt| format!("\n\n---\n## Testing Strategy (from plan)\n{excerpt}"))
            .unwrap_or_default();

        let coder_outputs = context.outputs_for(RoleKind::Coder);
        let coder_section = if coder_outputs.is_empty() {
            String::new()
        } else {
            let body = coder_outputs
                .iter()
                .map(|r| {
                    let status = if r.success { "succeeded" } else { "failed" };
                    format!(
                        "### {} attempt {} ({status})\n{}",
                        r.agent_id,
                        r.attempt,
                        if r.success {
                            r.output.as_str()
                        } else {
                            r.error.as_deref().unwrap_or("unknown error")
                        }
                    )
                })
                .collect::<Vec<_>>()
                .join("\n\n");
            format!("\n\n---\n## Coder Output\n{body}")
        };

        let history = format_attempts(
            "Previous Testing Attempts",
            &context.last_attempts_for(RoleKind::Tester, ROLE_HISTORY_CAP),
        );

        format!(
            "You are the testing agent in an automated development pipeline.\n\
             \n\
             ## Task\n\
             {task}\n\
             \n\
             ## Working Directory\n\
             {work_dir}\n\
             \n\
             ## Instructions\n\
             Verify the implementation against the task. Run the tests the \
             plan's testing strategy calls for, report what passed and what \
             failed, give a quality score out of 10, and state clearly whether \
             you approve the change.\
             {strategy_section}{coder_section}{history}",
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
            tests_passed: extraction::pass_fail_assessment(&result.output),
            quality_score: extraction::quality_score(&result.output),
            approved: extraction::approval_flag(&result.output),
            ..Enrichment::default()
        };
        if enrichment.is_empty() {
            debug!(agent_id = %result.agent_id, "tester enrichment found nothing");
            return result;
        }
        result.with_enrichment(enrichment)
    }
}
