//! Agent context - the accumulator threaded through the pipeline
//!
//! The only cross-step mutable state. Later agents consume earlier agents'
//! text through the role-scoped queries here; the orchestrator appends one
//! result per attempt and advances the step counter, nothing else mutates.

use std::path::{Path, PathBuf};

use crate::types::{ExecutionResult, RoleKind};

/// Accumulating task state shared down the pipeline.
///
/// `previous_outputs` is append-only and its insertion order is execution
/// order; `total_steps` is fixed at creation.
#[derive(Debug, Clone)]
pub struct AgentContext {
    task_description: String,
    work_dir: PathBuf,
    current_step: usize,
    total_steps: usize,
    previous_outputs: Vec<ExecutionResult>,
}

impl AgentContext {
    /// Create a context for a pipeline of `total_steps` agents
    #[must_use]
    pub fn new(task_description: impl Into<String>, work_dir: PathBuf, total_steps: usize) -> Self {
        Self {
            task_description: task_description.into(),
            work_dir,
            current_step: 0,
            total_steps,
            previous_outputs: Vec::new(),
        }
    }

    /// The task description (immutable)
    #[must_use]
    pub fn task_description(&self) -> &str {
        &self.task_description
    }

    /// The resolved working directory (immutable)
    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// 1-based position of the agent currently executing
    #[must_use]
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Number of agents in the pipeline, fixed at creation
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Advance to the agent at `index` (0-based definition order).
    ///
    /// The counter only moves forward; a stale index is ignored.
    pub fn advance_to(&mut self, index: usize) {
        let step = index + 1;
        if step > self.current_step {
            self.current_step = step;
        }
    }

    /// All recorded attempts, in execution order
    #[must_use]
    pub fn previous_outputs(&self) -> &[ExecutionResult] {
        &self.previous_outputs
    }

    /// Append one attempt's result. Append-only; results are never
    /// reordered or removed.
    pub fn record(&mut self, result: ExecutionResult) {
        self.previous_outputs.push(result);
    }

    /// Latest successful output text for a role, if any
    #[must_use]
    pub fn latest_output_for(&self, role: RoleKind) -> Option<&ExecutionResult> {
        self.previous_outputs
            .iter()
            .rev()
            .find(|r| r.role == role && r.success)
    }

    /// All attempts for a role, in execution order
    #[must_use]
    pub fn outputs_for(&self, role: RoleKind) -> Vec<&ExecutionResult> {
        self.previous_outputs
            .iter()
            .filter(|r| r.role == role)
            .collect()
    }

    /// The last `n` attempts for a role, in execution order
    #[must_use]
    pub fn last_attempts_for(&self, role: RoleKind, n: usize) -> Vec<&ExecutionResult> {
        let all = self.outputs_for(role);
        let skip = all.len().saturating_sub(n);
        all.into_iter().skip(skip).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AgentDefinition;

    fn result(role: RoleKind, attempt: u32, success: bool, output: &str) -> ExecutionResult {
        let definition = AgentDefinition::new("agent", "model", role);
        if success {
            ExecutionResult::succeeded(&definition, attempt, output)
        } else {
            ExecutionResult::failed(&definition, attempt, output)
        }
    }

    #[test]
    fn test_counters() {
        let mut ctx = AgentContext::new("task", PathBuf::from("/w"), 3);
        assert_eq!(ctx.current_step(), 0);
        assert_eq!(ctx.total_steps(), 3);

        ctx.advance_to(0);
        assert_eq!(ctx.current_step(), 1);
        ctx.advance_to(2);
        assert_eq!(ctx.current_step(), 3);
        // stale index does not move the counter back
        ctx.advance_to(1);
        assert_eq!(ctx.current_step(), 3);
    }

    #[test]
    fn test_role_scoped_queries() {
        let mut ctx = AgentContext::new("task", PathBuf::from("/w"), 2);
        ctx.record(result(RoleKind::Planner, 1, true, "plan v1"));
        ctx.record(result(RoleKind::Coder, 1, false, "tool crashed"));
        ctx.record(result(RoleKind::Coder, 2, true, "patch v2"));

        let latest = ctx.latest_output_for(RoleKind::Coder).unwrap();
        assert_eq!(latest.output, "patch v2");

        assert_eq!(ctx.outputs_for(RoleKind::Coder).len(), 2);
        assert!(ctx.latest_output_for(RoleKind::Tester).is_none());
    }

    #[test]
    fn test_last_attempts_cap() {
        let mut ctx = AgentContext::new("task", PathBuf::from("/w"), 1);
        for attempt in 1..=4 {
            ctx.record(result(RoleKind::Planner, attempt, false, "nope"));
        }
        let last_two = ctx.last_attempts_for(RoleKind::Planner, 2);
        assert_eq!(last_two.len(), 2);
        assert_eq!(last_two[0].attempt, 3);
        assert_eq!(last_two[1].attempt, 4);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut ctx = AgentContext::new("task", PathBuf::from("/w"), 3);
        ctx.record(result(RoleKind::Planner, 1, true, "a"));
        ctx.record(result(RoleKind::Coder, 1, true, "b"));
        ctx.record(result(RoleKind::Tester, 1, true, "c"));

        let roles: Vec<RoleKind> = ctx.previous_outputs().iter().map(|r| r.role).collect();
        assert_eq!(roles, vec![RoleKind::Planner, RoleKind::Coder, RoleKind::Tester]);
    }
}
