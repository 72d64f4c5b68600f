//! Step plan generation
//!
//! Fixed template: 3 initialization steps, 3 steps per agent, 2 completion
//! steps. Regenerating from an identical agent list yields an identical
//! plan.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::plan::{
    step_id, PreGeneratedStep, StepAgentContext, StepPhase, StepType, StepsPlan,
};
use crate::types::AgentDefinition;

/// Duration-model parameters for plan estimates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepPlanConfig {
    /// Fixed cost of the initialization phase
    #[serde(default = "default_init_seconds")]
    pub init_seconds: u64,
    /// Cost per agent
    #[serde(default = "default_per_agent_seconds")]
    pub per_agent_seconds: u64,
    /// Fixed cost of the completion phase
    #[serde(default = "default_completion_seconds")]
    pub completion_seconds: u64,
}

fn default_init_seconds() -> u64 {
    15
}

fn default_per_agent_seconds() -> u64 {
    180
}

fn default_completion_seconds() -> u64 {
    30
}

impl Default for StepPlanConfig {
    fn default() -> Self {
        Self {
            init_seconds: default_init_seconds(),
            per_agent_seconds: default_per_agent_seconds(),
            completion_seconds: default_completion_seconds(),
        }
    }
}

/// Derives the immutable step plan from the agent-definition list
#[derive(Debug, Clone, Default)]
pub struct StepPlanGenerator {
    config: StepPlanConfig,
}

impl StepPlanGenerator {
    /// Create a generator with default duration parameters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator with explicit duration parameters
    #[must_use]
    pub fn with_config(config: StepPlanConfig) -> Self {
        Self { config }
    }

    /// The generated per-agent name embedded in step ids: `"{role}_{index+1}"`
    #[must_use]
    pub fn agent_name(definition: &AgentDefinition, index: usize) -> String {
        format!("{}_{}", definition.role.as_str(), index + 1)
    }

    /// Generate the full plan for `agents`. Pure over its inputs: the same
    /// task id and agent list always produce the same plan.
    #[must_use]
    pub fn generate(&self, task_id: Uuid, agents: &[AgentDefinition]) -> StepsPlan {
        let mut steps = Vec::with_capacity(3 + 3 * agents.len() + 2);

        let init = [
            (StepType::TaskReceived, "Task received"),
            (StepType::PreparingWorkspace, "Preparing workspace"),
            (StepType::GeneratingPlan, "Generating execution plan"),
        ];
        for (step, description) in init {
            steps.push(PreGeneratedStep {
                step_id: step_id(StepPhase::Initialization, step, None),
                phase: StepPhase::Initialization,
                step,
                agent: None,
                index: steps.len(),
                description: Some(description.to_string()),
            });
        }

        for (position, definition) in agents.iter().enumerate() {
            let name = Self::agent_name(definition, position);
            let agent = StepAgentContext {
                name: name.clone(),
                agent_id: definition.id.clone(),
                model: definition.model.clone(),
                role: definition.role,
                position: position + 1,
            };
            let per_agent = [
                (StepType::AgentStarting, format!("{name} starting")),
                (StepType::AgentWorking, format!("{name} working")),
                (StepType::AgentFinishing, format!("{name} finishing")),
            ];
            for (step, description) in per_agent {
                steps.push(PreGeneratedStep {
                    step_id: step_id(StepPhase::AgentExecution, step, Some(&name)),
                    phase: StepPhase::AgentExecution,
                    step,
                    agent: Some(agent.clone()),
                    index: steps.len(),
                    description: Some(description),
                });
            }
        }

        let completion = [
            (StepType::AggregatingResults, "Aggregating results"),
            (StepType::CreatingPr, "Creating pull request"),
        ];
        for (step, description) in completion {
            steps.push(PreGeneratedStep {
                step_id: step_id(StepPhase::Completion, step, None),
                phase: StepPhase::Completion,
                step,
                agent: None,
                index: steps.len(),
                description: Some(description.to_string()),
            });
        }

        let total_steps = steps.len();
        StepsPlan {
            task_id,
            steps,
            total_steps,
            estimated_duration_seconds: self.estimate_duration(agents.len()),
        }
    }

    /// Linear duration model: fixed init + N x per-agent + fixed completion
    #[must_use]
    pub fn estimate_duration(&self, agent_count: usize) -> u64 {
        self.config.init_seconds
            + agent_count as u64 * self.config.per_agent_seconds
            + self.config.completion_seconds
    }
}
