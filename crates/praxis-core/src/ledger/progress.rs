//! The progress ledger
//!
//! Ordering contract: persist first, notify second. A store failure aborts
//! the transition and propagates; a notification "failure" (no subscribers,
//! lagged receivers) is invisible to callers and never rolls anything back.

use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::record::{ProgressRecord, StepStatus};
use super::store::ProgressStore;
use crate::error::Result;
use crate::event_bus::TaskEventBus;
use crate::steps::StepsPlan;

/// Records status transitions for one task, durably, then fans them out.
///
/// The pre-generated plan acts as an allow-list: transitions for step ids
/// the plan does not contain are dropped with a warning, writing nothing.
pub struct ProgressLedger {
    store: Arc<dyn ProgressStore>,
    bus: Arc<TaskEventBus>,
    plan: StepsPlan,
}

impl ProgressLedger {
    /// Create a ledger for the task the plan was generated for
    #[must_use]
    pub fn new(store: Arc<dyn ProgressStore>, bus: Arc<TaskEventBus>, plan: StepsPlan) -> Self {
        Self { store, bus, plan }
    }

    /// The task this ledger records for
    #[must_use]
    pub fn task_id(&self) -> Uuid {
        self.plan.task_id
    }

    /// The plan acting as the allow-list
    #[must_use]
    pub fn plan(&self) -> &StepsPlan {
        &self.plan
    }

    /// Mark a step as in progress
    pub async fn mark_in_progress(&self, step_id: &str) -> Result<()> {
        self.transition(step_id, StepStatus::InProgress, None).await
    }

    /// Mark a step as completed
    pub async fn mark_completed(&self, step_id: &str) -> Result<()> {
        self.transition(step_id, StepStatus::Completed, None).await
    }

    /// Mark a step as failed, carrying the error description
    pub async fn mark_failed(&self, step_id: &str, error: impl Into<String>) -> Result<()> {
        self.transition(step_id, StepStatus::Failed, Some(error.into()))
            .await
    }

    /// The single most recent record across all steps of the task
    pub async fn current_progress(&self) -> Result<Option<ProgressRecord>> {
        self.store.latest(self.plan.task_id).await
    }

    /// Every record for the task, in append order
    pub async fn history(&self) -> Result<Vec<ProgressRecord>> {
        self.store.records_for_task(self.plan.task_id).await
    }

    async fn transition(
        &self,
        step_id: &str,
        status: StepStatus,
        error: Option<String>,
    ) -> Result<()> {
        // The plan is an allow-list, not documentation: unknown ids are
        // dropped without a record and without an error.
        let Some(step) = self.plan.step(step_id) else {
            warn!(
                task_id = %self.plan.task_id,
                step_id = %step_id,
                "dropping progress event for step not in plan"
            );
            return Ok(());
        };

        let mut record = ProgressRecord::new(
            self.plan.task_id,
            &step.step_id,
            status,
            step.phase,
            step.step,
        );
        if let Some(agent) = &step.agent {
            record = record.with_agent(agent.clone());
        }
        if let Some(error) = error {
            record = record.with_error(error);
        }

        // Durability first; a failure here is fatal to the transition.
        let event = record.to_event();
        self.store.append(record).await?;

        // Best-effort fan-out only after the record is durable.
        let delivered = self.bus.publish(self.plan.task_id, event);
        if delivered == 0 {
            debug!(
                task_id = %self.plan.task_id,
                step_id = %step_id,
                "no live subscribers for progress event"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::ledger::MemoryProgressStore;
    use crate::steps::StepPlanGenerator;
    use crate::types::{AgentDefinition, RoleKind};
    use async_trait::async_trait;

    /// Store whose appends always fail, for the fatal-persistence path
    struct FailingStore;

    #[async_trait]
    impl ProgressStore for FailingStore {
        async fn append(&self, _record: ProgressRecord) -> Result<()> {
            Err(Error::Persistence("disk full".to_string()))
        }

        async fn latest(&self, _task_id: Uuid) -> Result<Option<ProgressRecord>> {
            Ok(None)
        }

        async fn latest_for_step(
            &self,
            _task_id: Uuid,
            _step_id: &str,
        ) -> Result<Option<ProgressRecord>> {
            Ok(None)
        }

        async fn records_for_task(&self, _task_id: Uuid) -> Result<Vec<ProgressRecord>> {
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn make_ledger(store: Arc<dyn ProgressStore>) -> (ProgressLedger, Arc<TaskEventBus>) {
        let agents = vec![
            AgentDefinition::new("claude", "sonnet-4", RoleKind::Planner),
            AgentDefinition::new("claude", "sonnet-4", RoleKind::Coder),
        ];
        let plan = StepPlanGenerator::new().generate(Uuid::new_v4(), &agents);
        let bus = Arc::new(TaskEventBus::default());
        (ProgressLedger::new(store, Arc::clone(&bus), plan), bus)
    }

    #[tokio::test]
    async fn test_persist_then_notify() {
        let store = Arc::new(MemoryProgressStore::new());
        let (ledger, bus) = make_ledger(store.clone());
        let mut rx = bus.subscribe(ledger.task_id());

        ledger
            .mark_in_progress("agent_execution_agent_working_coder_2")
            .await
            .unwrap();

        let record = ledger.current_progress().await.unwrap().unwrap();
        assert_eq!(record.step_id, "agent_execution_agent_working_coder_2");
        assert_eq!(record.status, StepStatus::InProgress);
        assert_eq!(record.agent.as_ref().unwrap().name, "coder_2");

        let event = rx.recv().await.unwrap();
        assert_eq!(event.step_id, record.step_id);
        assert_eq!(event.status, record.status);
    }

    #[tokio::test]
    async fn test_unknown_step_id_is_dropped() {
        let store = Arc::new(MemoryProgressStore::new());
        let (ledger, _bus) = make_ledger(store.clone());

        // not in the plan: no record written, no error raised
        ledger
            .mark_in_progress("agent_execution_agent_working_reviewer_9")
            .await
            .unwrap();

        assert!(store.is_empty().await);
        assert!(ledger.current_progress().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_persistence_failure_propagates() {
        let (ledger, bus) = make_ledger(Arc::new(FailingStore));
        let mut rx = bus.subscribe(ledger.task_id());

        let err = ledger
            .mark_completed("initialization_task_received")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));

        // nothing was published for the failed write
        assert!(matches!(
            rx.try_recv(),
            Err(tokio::sync::broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_no_subscribers_does_not_fail() {
        let store = Arc::new(MemoryProgressStore::new());
        let (ledger, _bus) = make_ledger(store.clone());

        ledger
            .mark_failed("completion_creating_pr", "github unreachable")
            .await
            .unwrap();

        let record = ledger.current_progress().await.unwrap().unwrap();
        assert_eq!(record.status, StepStatus::Failed);
        assert_eq!(record.error.as_deref(), Some("github unreachable"));
    }

    #[tokio::test]
    async fn test_attempts_share_a_step_id() {
        let store = Arc::new(MemoryProgressStore::new());
        let (ledger, _bus) = make_ledger(store.clone());
        let step = "agent_execution_agent_working_coder_2";

        ledger.mark_in_progress(step).await.unwrap();
        ledger.mark_in_progress(step).await.unwrap();
        ledger.mark_completed(step).await.unwrap();

        let history = ledger.history().await.unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|r| r.step_id == step));
        assert_eq!(history[2].status, StepStatus::Completed);
    }
}
