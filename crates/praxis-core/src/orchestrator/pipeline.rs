//! Main execution loop
//!
//! Later agents consume earlier agents' text, so there is nothing to
//! parallelize within a task. Every agent is attempted
//! regardless of what happened before it; only pre-flight validation and
//! persistence failures can abort.

use praxis_agent::ExecutionRequest;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::core::Orchestrator;
use crate::context::AgentContext;
use crate::error::Result;
use crate::ledger::ProgressLedger;
use crate::roles::AgentRole;
use crate::steps::{step_id, StepPhase, StepPlanGenerator, StepType};
use crate::types::{AgentDefinition, ExecutionResult, MultiAgentResponse, TaskInput};

impl Orchestrator {
    /// Execute the full pipeline for a task.
    ///
    /// Returns once all agents have been attempted (or cancellation stopped
    /// the pipeline from advancing). The only error paths are pre-flight
    /// validation and ledger persistence failures.
    pub async fn execute_task(&self, input: TaskInput) -> Result<MultiAgentResponse> {
        Self::validate(&input)?;

        let plan = self.plan_task(&input)?;
        let ledger = ProgressLedger::new(
            Arc::clone(&self.store),
            Arc::clone(&self.bus),
            plan.clone(),
        );

        let cancel_token = CancellationToken::new();
        self.active_tasks.insert(input.task_id, cancel_token.clone());

        let result = self
            .execute_inner(&input, &ledger, &cancel_token)
            .await;

        self.active_tasks.remove(&input.task_id);
        // Receivers can still drain what was buffered before the channel
        // went away.
        self.bus.remove_task(input.task_id);
        result
    }

    async fn execute_inner(
        &self,
        input: &TaskInput,
        ledger: &ProgressLedger,
        cancel_token: &CancellationToken,
    ) -> Result<MultiAgentResponse> {
        info!(
            task_id = %input.task_id,
            agents = input.agents.len(),
            "starting pipeline"
        );

        // Initialization phase: validated, workspace resolved, plan ready.
        for step in [
            StepType::TaskReceived,
            StepType::PreparingWorkspace,
            StepType::GeneratingPlan,
        ] {
            self.run_marker_step(ledger, StepPhase::Initialization, step)
                .await?;
        }

        let mut context = AgentContext::new(
            input.description.clone(),
            input.work_dir.to_path_buf(),
            input.agents.len(),
        );

        for (index, definition) in input.agents.iter().enumerate() {
            if cancel_token.is_cancelled() {
                warn!(
                    task_id = %input.task_id,
                    position = index + 1,
                    "cancellation requested, pipeline stops advancing"
                );
                break;
            }

            // Unsupported roles degrade to the Coder strategy.
            let role = self.factory.create_or_coder(definition.role);
            self.run_agent(input, index, definition, role, &mut context, ledger)
                .await?;
        }

        // Completion phase: aggregate, then hand off for publication.
        self.run_marker_step(ledger, StepPhase::Completion, StepType::AggregatingResults)
            .await?;
        let response = self.build_response(&context);
        self.run_marker_step(ledger, StepPhase::Completion, StepType::CreatingPr)
            .await?;

        info!(
            task_id = %input.task_id,
            success = response.success,
            attempts = response.execution_log.len(),
            "pipeline finished"
        );
        Ok(response)
    }

    /// One agent position: prompt once, then the retry loop.
    ///
    /// Attempts are transparent at the ledger level: every attempt re-marks
    /// the same `agent_working` step id, and only the last interim/terminal
    /// status matters for that id.
    async fn run_agent(
        &self,
        input: &TaskInput,
        index: usize,
        definition: &AgentDefinition,
        role: Arc<dyn AgentRole>,
        context: &mut AgentContext,
        ledger: &ProgressLedger,
    ) -> Result<()> {
        context.advance_to(index);

        let name = StepPlanGenerator::agent_name(definition, index);
        let starting_id = step_id(StepPhase::AgentExecution, StepType::AgentStarting, Some(&name));
        let working_id = step_id(StepPhase::AgentExecution, StepType::AgentWorking, Some(&name));
        let finishing_id =
            step_id(StepPhase::AgentExecution, StepType::AgentFinishing, Some(&name));

        ledger.mark_in_progress(&starting_id).await?;
        // Built once; retries reuse the same prompt.
        let prompt = role.create_prompt(&input.description, context, definition);
        ledger.mark_completed(&starting_id).await?;

        let max_attempts = role.max_retries() + 1;

        for attempt in 1..=max_attempts {
            ledger.mark_in_progress(&working_id).await?;

            let result = self
                .attempt_execution(input, definition, &prompt, attempt)
                .await;
            let result = role.post_execution_hook(result, context);
            let success = result.success;
            let error = result.error.clone();

            // Every attempt lands in the log, success or not.
            context.record(result);

            if success {
                info!(
                    task_id = %input.task_id,
                    agent = %name,
                    attempt = attempt,
                    "agent attempt succeeded"
                );
                ledger.mark_completed(&working_id).await?;
                break;
            }

            let exhausted = attempt == max_attempts || !role.should_retry();
            if exhausted {
                warn!(
                    task_id = %input.task_id,
                    agent = %name,
                    attempt = attempt,
                    "agent failed, no more retries"
                );
                ledger
                    .mark_failed(&working_id, error.unwrap_or_else(|| "unknown error".to_string()))
                    .await?;
                break;
            }

            let delay = self.config.retry_delay(attempt);
            warn!(
                task_id = %input.task_id,
                agent = %name,
                attempt = attempt,
                delay_ms = delay.as_millis() as u64,
                "agent attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }

        ledger.mark_in_progress(&finishing_id).await?;
        ledger.mark_completed(&finishing_id).await?;
        Ok(())
    }

    /// One invocation of the external capability, converted to an
    /// `ExecutionResult`. Nothing the executor does can escape: errors and
    /// timeouts become failed results subject to the role's retry policy.
    async fn attempt_execution(
        &self,
        input: &TaskInput,
        definition: &AgentDefinition,
        prompt: &str,
        attempt: u32,
    ) -> ExecutionResult {
        let timeout = self.config.attempt_timeout();
        let request = ExecutionRequest::new(prompt, &definition.model, input.work_dir.clone())
            .with_timeout(timeout);

        match tokio::time::timeout(timeout, self.executor.execute(request)).await {
            Ok(Ok(outcome)) if outcome.success => {
                ExecutionResult::succeeded(definition, attempt, outcome.content)
            }
            Ok(Ok(outcome)) => ExecutionResult::failed(
                definition,
                attempt,
                outcome
                    .error
                    .unwrap_or_else(|| "agent reported failure".to_string()),
            ),
            Ok(Err(e)) => ExecutionResult::failed(definition, attempt, e.to_string()),
            Err(_) => ExecutionResult::failed(
                definition,
                attempt,
                format!("execution timed out after {}s", timeout.as_secs()),
            ),
        }
    }

    /// Emit in_progress/completed around a phase-level step with no agent
    async fn run_marker_step(
        &self,
        ledger: &ProgressLedger,
        phase: StepPhase,
        step: StepType,
    ) -> Result<()> {
        let id = step_id(phase, step, None);
        ledger.mark_in_progress(&id).await?;
        ledger.mark_completed(&id).await?;
        Ok(())
    }
}
