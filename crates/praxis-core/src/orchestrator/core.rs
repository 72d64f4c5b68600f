//! Orchestrator core structure
//!
//! Contains the main `Orchestrator` struct and its builder methods. All
//! collaborators (executor, store, bus) are injected; nothing is reached
//! through global state.

use dashmap::DashMap;
use praxis_agent::AgentExecutor;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use super::config::OrchestratorConfig;
use crate::error::{Error, Result};
use crate::event_bus::TaskEventBus;
use crate::ledger::ProgressStore;
use crate::roles::RoleFactory;
use crate::steps::{StepPlanGenerator, StepsPlan};
use crate::types::{AgentDefinition, TaskInput};

/// Drives the sequential multi-role pipeline for one task at a time;
/// multiple tasks may run concurrently on clones of the same collaborators.
pub struct Orchestrator {
    pub(crate) executor: Arc<dyn AgentExecutor>,
    pub(crate) store: Arc<dyn ProgressStore>,
    pub(crate) bus: Arc<TaskEventBus>,
    pub(crate) factory: RoleFactory,
    pub(crate) config: OrchestratorConfig,
    /// Active tasks with cancellation tokens for cooperative cancel
    pub(crate) active_tasks: Arc<DashMap<Uuid, CancellationToken>>,
}

impl Orchestrator {
    /// Create a new orchestrator with default roles and configuration
    #[must_use]
    pub fn new(
        executor: Arc<dyn AgentExecutor>,
        store: Arc<dyn ProgressStore>,
        bus: Arc<TaskEventBus>,
    ) -> Self {
        Self {
            executor,
            store,
            bus,
            factory: RoleFactory::with_defaults(),
            config: OrchestratorConfig::default(),
            active_tasks: Arc::new(DashMap::new()),
        }
    }

    /// Set the configuration
    #[must_use]
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the role factory (custom or re-registered strategies)
    #[must_use]
    pub fn with_role_factory(mut self, factory: RoleFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Get the event bus used for progress fan-out
    #[must_use]
    pub fn bus(&self) -> &Arc<TaskEventBus> {
        &self.bus
    }

    /// Number of tasks currently executing
    #[must_use]
    pub fn active_task_count(&self) -> usize {
        self.active_tasks.len()
    }

    /// Generate the immutable step plan for a task, without executing.
    ///
    /// Runs pre-flight validation first, so a plan in hand means the task
    /// would be accepted. This is what makes progress displayable before
    /// the first event arrives.
    pub fn plan_task(&self, input: &TaskInput) -> Result<StepsPlan> {
        Self::validate(input)?;
        let generator = StepPlanGenerator::with_config(self.config.step_plan.clone());
        Ok(generator.generate(input.task_id, &input.agents))
    }

    /// Request cooperative cancellation of a running task.
    ///
    /// The in-flight agent call is not interrupted; the pipeline stops
    /// advancing once the current step settles. Returns false when the
    /// task is not active.
    pub fn cancel_task(&self, task_id: Uuid) -> bool {
        if let Some(entry) = self.active_tasks.get(&task_id) {
            entry.value().cancel();
            info!(task_id = %task_id, "task cancellation requested");
            true
        } else {
            false
        }
    }

    /// Pre-flight validation: fail fast before any execution or ledger write
    pub(crate) fn validate(input: &TaskInput) -> Result<()> {
        if input.agents.is_empty() {
            return Err(Error::InvalidTask("agent list is empty".to_string()));
        }
        if input.description.trim().is_empty() {
            return Err(Error::InvalidTask("task description is empty".to_string()));
        }

        let mut seen: Vec<&AgentDefinition> = Vec::new();
        for definition in &input.agents {
            if definition.id.trim().is_empty() {
                return Err(Error::InvalidTask(format!(
                    "agent with role {} has an empty id",
                    definition.role
                )));
            }
            if seen.iter().any(|d| d.role == definition.role) {
                return Err(Error::DuplicateRole {
                    role: definition.role,
                });
            }
            seen.push(definition);
        }
        Ok(())
    }
}
