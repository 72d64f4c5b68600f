//! Step plan data structures
//!
//! `step_id` is a pure function of (phase, step type, optional agent id):
//! no randomness, no dependence on attempt count. Retries re-mark the same
//! id; they never mint a new one.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::RoleKind;

/// Pipeline phase a step belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPhase {
    /// Pre-flight work before the first agent runs
    Initialization,
    /// Per-agent execution steps
    AgentExecution,
    /// Wrap-up work after the last agent
    Completion,
}

impl StepPhase {
    /// Returns the string representation of the phase
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialization => "initialization",
            Self::AgentExecution => "agent_execution",
            Self::Completion => "completion",
        }
    }
}

impl std::fmt::Display for StepPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StepPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initialization" => Ok(Self::Initialization),
            "agent_execution" => Ok(Self::AgentExecution),
            "completion" => Ok(Self::Completion),
            _ => Err(format!("unknown step phase: {s}")),
        }
    }
}

/// Step type within a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    /// Task accepted and recorded
    TaskReceived,
    /// Working directory resolved and prepared
    PreparingWorkspace,
    /// Step plan generated
    GeneratingPlan,
    /// Agent is being set up
    AgentStarting,
    /// Agent invocation in flight (retries stay on this step)
    AgentWorking,
    /// Agent result recorded and context updated
    AgentFinishing,
    /// Final response assembled from the execution log
    AggregatingResults,
    /// Pull request created from the results
    CreatingPr,
}

impl StepType {
    /// Returns the string representation of the step type
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskReceived => "task_received",
            Self::PreparingWorkspace => "preparing_workspace",
            Self::GeneratingPlan => "generating_plan",
            Self::AgentStarting => "agent_starting",
            Self::AgentWorking => "agent_working",
            Self::AgentFinishing => "agent_finishing",
            Self::AggregatingResults => "aggregating_results",
            Self::CreatingPr => "creating_pr",
        }
    }
}

impl std::fmt::Display for StepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StepType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task_received" => Ok(Self::TaskReceived),
            "preparing_workspace" => Ok(Self::PreparingWorkspace),
            "generating_plan" => Ok(Self::GeneratingPlan),
            "agent_starting" => Ok(Self::AgentStarting),
            "agent_working" => Ok(Self::AgentWorking),
            "agent_finishing" => Ok(Self::AgentFinishing),
            "aggregating_results" => Ok(Self::AggregatingResults),
            "creating_pr" => Ok(Self::CreatingPr),
            _ => Err(format!("unknown step type: {s}")),
        }
    }
}

/// Compute the deterministic id for a step.
///
/// `"{phase}_{step}"` for phase-level steps, `"{phase}_{step}_{agent}"`
/// for per-agent steps. Identical inputs always produce identical output;
/// embedding the agent name keeps ids collision-free across phases.
#[must_use]
pub fn step_id(phase: StepPhase, step: StepType, agent: Option<&str>) -> String {
    match agent {
        Some(name) => format!("{}_{}_{}", phase.as_str(), step.as_str(), name),
        None => format!("{}_{}", phase.as_str(), step.as_str()),
    }
}

/// Per-agent payload embedded in plan steps and progress records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepAgentContext {
    /// Generated pipeline name embedded in step ids (e.g. "coder_2")
    pub name: String,
    /// Agent identity from the definition
    pub agent_id: String,
    /// Model the agent runs with
    pub model: String,
    /// Role the agent runs as
    pub role: RoleKind,
    /// 1-based pipeline position
    pub position: usize,
}

/// One pre-computed unit of progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreGeneratedStep {
    /// Deterministic step identifier
    pub step_id: String,
    /// Phase the step belongs to
    pub phase: StepPhase,
    /// Step type within the phase
    pub step: StepType,
    /// Per-agent context for agent-execution steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<StepAgentContext>,
    /// Position in the plan, 0-based
    pub index: usize,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The immutable, ordered step plan for one task.
///
/// Generated once before execution and never mutated; later progress
/// events are validated against its id set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepsPlan {
    /// Task the plan belongs to
    pub task_id: Uuid,
    /// Ordered steps
    pub steps: Vec<PreGeneratedStep>,
    /// Total step count (3 + 3·N + 2 for N agents)
    pub total_steps: usize,
    /// Linear-model duration estimate
    pub estimated_duration_seconds: u64,
}

impl StepsPlan {
    /// Whether `step_id` belongs to this plan
    #[must_use]
    pub fn contains(&self, step_id: &str) -> bool {
        self.steps.iter().any(|s| s.step_id == step_id)
    }

    /// Look up a step by id
    #[must_use]
    pub fn step(&self, step_id: &str) -> Option<&PreGeneratedStep> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }
}
