//! Final response aggregation
//!
//! Precedence for the final output: latest successful Tester, then latest
//! successful Coder, then latest successful Planner, then the most recent
//! successful result in execution order, then empty.

use super::core::Orchestrator;
use crate::context::AgentContext;
use crate::types::{MultiAgentResponse, RoleKind, TestResults};

impl Orchestrator {
    /// Build the aggregate response from the accumulated context
    pub(crate) fn build_response(&self, context: &AgentContext) -> MultiAgentResponse {
        let log = context.previous_outputs();
        let success = log.iter().any(|r| r.success);

        let final_output = [RoleKind::Tester, RoleKind::Coder, RoleKind::Planner]
            .iter()
            .find_map(|role| context.latest_output_for(*role))
            .or_else(|| log.iter().rev().find(|r| r.success))
            .map(|r| r.output.clone())
            .unwrap_or_default();

        // Only meaningful when a Tester actually ran.
        let test_results = log
            .iter()
            .rev()
            .find(|r| r.role == RoleKind::Tester)
            .map(|tester| TestResults {
                executed: true,
                success: tester.success,
                output: if tester.success {
                    tester.output.clone()
                } else {
                    tester.error.clone().unwrap_or_default()
                },
            });

        // The most specific available per-step error: the latest failed
        // attempt that carried error text.
        let error_message = if success {
            None
        } else {
            log.iter()
                .rev()
                .find_map(|r| r.error.clone())
                .or_else(|| Some("no agent produced a result".to_string()))
        };

        MultiAgentResponse {
            success,
            final_output,
            execution_log: log.to_vec(),
            test_results,
            error_message,
        }
    }
}
