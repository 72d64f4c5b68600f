//! Core types for the Praxis pipeline
//!
//! Task inputs, the closed role set, per-attempt execution results, and
//! the aggregate response returned once every agent has been attempted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// The closed set of pipeline roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    /// Produces the implementation plan
    Planner,
    /// Implements the plan
    Coder,
    /// Verifies the implementation
    Tester,
}

impl RoleKind {
    /// Returns the string representation of the role
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planner => "planner",
            Self::Coder => "coder",
            Self::Tester => "tester",
        }
    }
}

impl std::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RoleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planner" => Ok(Self::Planner),
            "coder" => Ok(Self::Coder),
            "tester" => Ok(Self::Tester),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// One pipeline position: who runs, with which model, as what role.
///
/// Immutable for the lifetime of the task. No two definitions in a task
/// may share a role; the orchestrator rejects duplicates pre-flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDefinition {
    /// Agent identity (e.g., "claude", "codex")
    pub id: String,
    /// Model identifier passed through to the executor
    pub model: String,
    /// Pipeline role
    pub role: RoleKind,
}

impl AgentDefinition {
    /// Create a new agent definition
    #[must_use]
    pub fn new(id: impl Into<String>, model: impl Into<String>, role: RoleKind) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            role,
        }
    }
}

/// Input for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskInput {
    /// Task identifier (ledger and fan-out are keyed by this)
    pub task_id: Uuid,
    /// What the agents are asked to do
    pub description: String,
    /// Resolved working directory for all invocations
    pub work_dir: PathBuf,
    /// Ordered agent definitions
    pub agents: Vec<AgentDefinition>,
}

impl TaskInput {
    /// Create a new task input with a fresh task id
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        work_dir: PathBuf,
        agents: Vec<AgentDefinition>,
    ) -> Self {
        Self {
            task_id: Uuid::new_v4(),
            description: description.into(),
            work_dir,
            agents,
        }
    }
}

/// Optional, non-authoritative payload extracted from free-text output.
///
/// Produced by role post-execution hooks via best-effort heuristics.
/// Downstream consumers must tolerate its absence; `None` enrichment is a
/// valid substitute for the whole stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    /// File paths the output mentions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files_mentioned: Vec<String>,
    /// Technologies the output mentions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub technologies: Vec<String>,
    /// Pass/fail assessment scanned from a Tester's output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests_passed: Option<bool>,
    /// Quality score (0.0 - 10.0) scanned from a Tester's output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f32>,
    /// Approval flag scanned from a Tester's output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
}

impl Enrichment {
    /// True when no heuristic produced anything
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files_mentioned.is_empty()
            && self.technologies.is_empty()
            && self.tests_passed.is_none()
            && self.quality_score.is_none()
            && self.approved.is_none()
    }
}

/// Result of one agent attempt.
///
/// One of these is appended to the execution log per attempt, success or
/// not; the log is never reordered or truncated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Agent identity from the definition
    pub agent_id: String,
    /// Model used
    pub model: String,
    /// Role the agent ran as
    pub role: RoleKind,
    /// Attempt number, starting at 1
    pub attempt: u32,
    /// Whether the attempt succeeded
    pub success: bool,
    /// Output text (empty on failure)
    pub output: String,
    /// Error description when the attempt failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the attempt settled
    pub timestamp: DateTime<Utc>,
    /// Role-specific heuristic enrichment (absent when nothing was found)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<Enrichment>,
}

impl ExecutionResult {
    /// Successful attempt
    #[must_use]
    pub fn succeeded(definition: &AgentDefinition, attempt: u32, output: impl Into<String>) -> Self {
        Self {
            agent_id: definition.id.clone(),
            model: definition.model.clone(),
            role: definition.role,
            attempt,
            success: true,
            output: output.into(),
            error: None,
            timestamp: Utc::now(),
            enrichment: None,
        }
    }

    /// Failed attempt carrying the captured error text
    #[must_use]
    pub fn failed(definition: &AgentDefinition, attempt: u32, error: impl Into<String>) -> Self {
        Self {
            agent_id: definition.id.clone(),
            model: definition.model.clone(),
            role: definition.role,
            attempt,
            success: false,
            output: String::new(),
            error: Some(error.into()),
            timestamp: Utc::now(),
            enrichment: None,
        }
    }

    /// Attach enrichment
    #[must_use]
    pub fn with_enrichment(mut self, enrichment: Enrichment) -> Self {
        self.enrichment = Some(enrichment);
        self
    }
}

/// Tester summary, populated only when a Tester actually ran
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResults {
    /// Whether a Tester was part of the pipeline and ran
    pub executed: bool,
    /// Whether the latest Tester attempt succeeded
    pub success: bool,
    /// The latest Tester output
    pub output: String,
}

/// Aggregate response once all agents have been attempted.
///
/// `success` is true when at least one agent succeeded; a run where only
/// the Planner succeeds still reports success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiAgentResponse {
    /// At least one agent succeeded
    pub success: bool,
    /// Best available output per the role precedence (Tester, then Coder,
    /// then Planner, then most recent success; empty when nothing succeeded)
    pub final_output: String,
    /// Every attempt, in execution order
    pub execution_log: Vec<ExecutionResult>,
    /// Tester summary, if a Tester ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_results: Option<TestResults>,
    /// Most specific per-step error when the run failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_kind_roundtrip() {
        for role in [RoleKind::Planner, RoleKind::Coder, RoleKind::Tester] {
            let s = role.to_string();
            let parsed: RoleKind = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
        assert!("reviewer".parse::<RoleKind>().is_err());
    }

    #[test]
    fn test_role_kind_serde() {
        let json = serde_json::to_string(&RoleKind::Coder).unwrap();
        assert_eq!(json, r#""coder""#);
    }

    #[test]
    fn test_enrichment_skipped_when_absent() {
        let definition = AgentDefinition::new("claude", "sonnet-4", RoleKind::Planner);
        let result = ExecutionResult::succeeded(&definition, 1, "plan");
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("enrichment"));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_failed_result_carries_error() {
        let definition = AgentDefinition::new("claude", "sonnet-4", RoleKind::Coder);
        let result = ExecutionResult::failed(&definition, 2, "connection reset");
        assert!(!result.success);
        assert_eq!(result.attempt, 2);
        assert_eq!(result.error.as_deref(), Some("connection reset"));
        assert!(result.output.is_empty());
    }
}
