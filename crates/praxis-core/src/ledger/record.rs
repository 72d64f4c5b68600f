//! Progress records and events
//!
//! Records are append-only: a step's history is a sequence of records for
//! the same step_id, and "current state" is whatever was written last.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::steps::{StepAgentContext, StepPhase, StepType};

/// Status of one step transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// The step is being worked on
    InProgress,
    /// The step finished successfully
    Completed,
    /// The step finished unsuccessfully
    Failed,
}

impl StepStatus {
    /// Returns the string representation of the status
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Check if the status is terminal for the step
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StepStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("unknown step status: {s}")),
        }
    }
}

/// One persisted status transition. Never updated, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Unique record identifier
    pub id: Uuid,
    /// Task the record belongs to
    pub task_id: Uuid,
    /// Step id from the pre-generated plan
    pub step_id: String,
    /// Transition status
    pub status: StepStatus,
    /// Phase of the step
    pub phase: StepPhase,
    /// Step type
    pub step: StepType,
    /// Agent-context snapshot for per-agent steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<StepAgentContext>,
    /// Error description for failed transitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the transition happened
    pub timestamp: DateTime<Utc>,
}

impl ProgressRecord {
    /// Create a new record stamped with the current time
    #[must_use]
    pub fn new(
        task_id: Uuid,
        step_id: impl Into<String>,
        status: StepStatus,
        phase: StepPhase,
        step: StepType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            step_id: step_id.into(),
            status,
            phase,
            step,
            agent: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach an agent-context snapshot
    #[must_use]
    pub fn with_agent(mut self, agent: StepAgentContext) -> Self {
        self.agent = Some(agent);
        self
    }

    /// Attach an error description
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// The notification payload for this record
    #[must_use]
    pub fn to_event(&self) -> ProgressEvent {
        ProgressEvent {
            task_id: self.task_id,
            step_id: self.step_id.clone(),
            status: self.status,
            phase: self.phase,
            step: self.step,
            agent: self.agent.clone(),
            error: self.error.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// One best-effort notification, pushed after its record is durable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Task the event belongs to
    pub task_id: Uuid,
    /// Step id from the pre-generated plan
    pub step_id: String,
    /// Transition status
    pub status: StepStatus,
    /// Phase of the step
    pub phase: StepPhase,
    /// Step type
    pub step: StepType,
    /// Agent-context snapshot for per-agent steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<StepAgentContext>,
    /// Error description for failed transitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the transition happened
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [StepStatus::InProgress, StepStatus::Completed, StepStatus::Failed] {
            let parsed: StepStatus = status.to_string().parse().unwrap();
            assert_eq!(status, parsed);
        }
        assert!("pending".parse::<StepStatus>().is_err());
    }

    #[test]
    fn test_status_terminality() {
        assert!(!StepStatus::InProgress.is_terminal());
        assert!(StepStatus::Completed.is_terminal());
        assert!(StepStatus::Failed.is_terminal());
    }

    #[test]
    fn test_record_to_event_mirrors_fields() {
        let record = ProgressRecord::new(
            Uuid::new_v4(),
            "completion_creating_pr",
            StepStatus::Failed,
            StepPhase::Completion,
            StepType::CreatingPr,
        )
        .with_error("github unreachable");

        let event = record.to_event();
        assert_eq!(event.task_id, record.task_id);
        assert_eq!(event.step_id, record.step_id);
        assert_eq!(event.status, StepStatus::Failed);
        assert_eq!(event.error.as_deref(), Some("github unreachable"));
        assert_eq!(event.timestamp, record.timestamp);
    }

    #[test]
    fn test_record_serialization() {
        let record = ProgressRecord::new(
            Uuid::nil(),
            "initialization_task_received",
            StepStatus::InProgress,
            StepPhase::Initialization,
            StepType::TaskReceived,
        );
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"status\":\"in_progress\""));
        assert!(json.contains("\"phase\":\"initialization\""));
        assert!(!json.contains("\"agent\""));
    }
}
